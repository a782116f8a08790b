//! Fact-check source: listing discovery and article scraping.
//!
//! [`FactSource`] is the capability interface the pipeline consumes;
//! [`HttpFactSource`] implements it against the live fact-check site
//! with reqwest and selector-based extraction.

mod parse;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use counterclaim_shared::{Article, CounterclaimError, Result, SourceConfig};

/// User-Agent string for source requests.
const USER_AGENT: &str = concat!("counterclaim/", env!("CARGO_PKG_VERSION"));

/// Capability interface for the fact-check source.
#[async_trait]
pub trait FactSource: Send + Sync {
    /// Slugs of the latest fact checks, newest-first.
    async fn latest_slugs(&self) -> Result<Vec<String>>;

    /// Scrape one article by slug.
    async fn scrape_article(&self, slug: &str) -> Result<Article>;
}

/// Live HTTP implementation of [`FactSource`].
pub struct HttpFactSource {
    client: Client,
    base_url: String,
}

impl HttpFactSource {
    /// Build an HTTP source from config.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CounterclaimError::Fetch(format!("failed to build HTTP client: {e}")))?;

        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CounterclaimError::Fetch(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CounterclaimError::Fetch(format!("GET {url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| CounterclaimError::Fetch(format!("reading body of {url}: {e}")))
    }
}

#[async_trait]
impl FactSource for HttpFactSource {
    async fn latest_slugs(&self) -> Result<Vec<String>> {
        let html = self.fetch_page(&self.base_url).await?;
        let slugs = parse::parse_listing(&html, &self.base_url)?;
        tracing::debug!(count = slugs.len(), "scraped listing page");
        Ok(slugs)
    }

    async fn scrape_article(&self, slug: &str) -> Result<Article> {
        let url = format!("{}{slug}/", self.base_url);
        let html = self.fetch_page(&url).await?;
        parse::parse_article(&html, slug)
    }
}
