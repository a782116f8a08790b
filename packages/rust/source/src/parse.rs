//! HTML extraction for the fact-check site layout.
//!
//! The listing page exposes article links under `.article_wrapper`;
//! article pages carry a title block, a rating container, and a flat
//! article body. All selectors are compile-time constants and parsing
//! failures surface as [`CounterclaimError::Parse`].

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

use counterclaim_shared::{Article, Claim, CounterclaimError, Result};

/// Date lines read "Published January 2, 2006".
const DATE_PREFIX: &str = "Published ";

fn selector(css: &str) -> Selector {
    // Selectors are static strings, a parse failure is a programmer error.
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Extract article slugs from the listing page, newest-first.
///
/// The site lists fact checks newest at the top, and that order is
/// preserved here: callers depend on index 0 being the most recent.
pub fn parse_listing(html: &str, base_url: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let links = selector(".article_wrapper > .outer_article_link_wrapper");

    let mut slugs = Vec::new();
    for element in doc.select(&links) {
        let Some(href) = element.value().attr("href") else {
            tracing::warn!("listing entry without href, skipping");
            continue;
        };
        match slug_from_href(href, base_url) {
            Some(slug) => slugs.push(slug),
            None => tracing::warn!(href, "listing href yields no slug, skipping"),
        }
    }
    Ok(slugs)
}

/// Derive a slug from an article link.
///
/// Prefers stripping the configured base URL; falls back to the last
/// path segment for hrefs served from another host.
fn slug_from_href(href: &str, base_url: &str) -> Option<String> {
    let path = href.strip_prefix(base_url).unwrap_or(href);
    let slug = path.trim_matches('/').rsplit('/').next()?;
    if slug.is_empty() {
        return None;
    }
    Some(slug.to_string())
}

/// Extract a full [`Article`] from an article page.
pub fn parse_article(html: &str, slug: &str) -> Result<Article> {
    let doc = Html::parse_document(html);

    let title_container = doc
        .select(&selector("section.title-container"))
        .next()
        .ok_or_else(|| CounterclaimError::parse(format!("no title container for {slug}")))?;

    let title = text_of(&title_container, "h1")
        .ok_or_else(|| CounterclaimError::parse(format!("no title for {slug}")))?;
    let subtitle = text_of(&title_container, "h2")
        .ok_or_else(|| CounterclaimError::parse(format!("no subtitle for {slug}")))?;
    let date = extract_date(&title_container)?;
    let claim = extract_claim(&doc)?;

    let content = doc
        .select(&selector("#article-content"))
        .next()
        .map(|body| collect_paragraphs(&body))
        .unwrap_or_default();

    Ok(Article {
        slug: slug.to_string(),
        title,
        subtitle,
        date,
        claim,
        content,
    })
}

fn text_of(scope: &ElementRef, css: &str) -> Option<String> {
    let found = scope.select(&selector(css)).next()?;
    let text = flatten_text(&found);
    if text.is_empty() { None } else { Some(text) }
}

fn extract_date(title_container: &ElementRef) -> Result<NaiveDate> {
    let raw = text_of(title_container, ".publish_date")
        .ok_or_else(|| CounterclaimError::parse("no publish date"))?;
    let trimmed = raw.strip_prefix(DATE_PREFIX).unwrap_or(&raw);

    NaiveDate::parse_from_str(trimmed, "%B %d, %Y")
        .map_err(|e| CounterclaimError::parse(format!("bad publish date {trimmed:?}: {e}")))
}

fn extract_claim(doc: &Html) -> Result<Claim> {
    let container = doc
        .select(&selector("#fact_check_rating_container"))
        .next()
        .ok_or_else(|| CounterclaimError::parse("no rating container"))?;

    let question = text_of(&container, ".claim_cont")
        .ok_or_else(|| CounterclaimError::parse("no claim question"))?;

    let rating_str = extract_rating_text(&container)
        .ok_or_else(|| CounterclaimError::parse("no rating text"))?;
    let rating = rating_str.parse()?;

    let context = text_of(&container, ".fact_check_info_description");

    Ok(Claim {
        question,
        rating,
        context,
    })
}

/// The rating title wrap mixes the rating text node with icon markup;
/// only the first non-empty direct text node is the rating itself.
fn extract_rating_text(container: &ElementRef) -> Option<String> {
    let wrap = container.select(&selector(".rating_title_wrap")).next()?;
    for child in wrap.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Walk the article body and flatten its paragraphs into one list.
///
/// Section wrappers, scripts, and form inputs are skipped; nested divs
/// are recursed into without preserving the nesting.
fn collect_paragraphs(body: &ElementRef) -> Vec<String> {
    let mut content = Vec::new();
    for child in body.child_elements() {
        match child.value().name() {
            "section" | "script" | "input" => {}
            "p" => {
                let text = flatten_text(&child);
                if !text.is_empty() {
                    content.push(text);
                }
            }
            _ => content.extend(collect_paragraphs(&child)),
        }
    }
    content
}

/// Join an element's text nodes with single spaces, dropping
/// whitespace-only runs that inline markup leaves behind.
fn flatten_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
