//! HTML rendering for spoof articles and the recent-items index.
//!
//! Rendering is pure: bytes in, bytes out, no I/O. The pipeline hands
//! the rendered artifacts to the publication target.

use maud::{DOCTYPE, Markup, html};

use counterclaim_shared::{Result, Spoof, SpoofStub};

/// Renders spoofs and the recent-items index to artifacts.
pub trait Renderer: Send + Sync {
    /// Render one spoof as a standalone HTML page.
    fn render_spoof(&self, spoof: &Spoof) -> Result<Vec<u8>>;

    /// Render the recent-items index. Stubs are expected newest-first
    /// and are emitted in the order given.
    fn render_index(&self, stubs: &[SpoofStub]) -> Result<Vec<u8>>;
}

/// The built-in [`Renderer`].
pub struct HtmlRenderer;

impl HtmlRenderer {
    fn page(title: &str, body: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width, initial-scale=1";
                    title { (title) }
                }
                body {
                    (body)
                }
            }
        }
    }
}

impl Renderer for HtmlRenderer {
    fn render_spoof(&self, spoof: &Spoof) -> Result<Vec<u8>> {
        let body = html! {
            article {
                header {
                    h1 { (spoof.title) }
                    h2 { (spoof.subtitle) }
                    p .publish-date { "Published " (spoof.date.format("%B %-d, %Y")) }
                }
                section .claim {
                    p .question { (spoof.claim.question) }
                    p .rating { (spoof.claim.rating) }
                    @if let Some(context) = &spoof.claim.context {
                        p .context { (context) }
                    }
                }
                section .content {
                    @for paragraph in &spoof.content {
                        p { (paragraph) }
                    }
                }
            }
        };

        let markup = Self::page(&spoof.title, body);
        Ok(markup.into_string().into_bytes())
    }

    fn render_index(&self, stubs: &[SpoofStub]) -> Result<Vec<u8>> {
        let body = html! {
            h1 { "Latest" }
            ul .latest {
                @for stub in stubs {
                    li {
                        a href={ (stub.slug) ".html" } { (stub.title) }
                        p .subtitle { (stub.subtitle) }
                        time datetime=(stub.date) { (stub.date.format("%B %-d, %Y")) }
                    }
                }
            }
        };

        let markup = Self::page("Latest", body);
        Ok(markup.into_string().into_bytes())
    }
}
