//! In-memory collaborator doubles with failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use counterclaim_publish::{MemoryPublisher, Publisher};
use counterclaim_render::{HtmlRenderer, Renderer};
use counterclaim_shared::{
    Article, Claim, CounterclaimError, Rating, Result, Spoof, SpoofStub,
};
use counterclaim_source::FactSource;
use counterclaim_spoof::Spoofer;
use counterclaim_storage::RecordStore;

use crate::run::Orchestrator;

pub(crate) fn sample_article(slug: &str) -> Article {
    Article {
        slug: slug.into(),
        title: format!("Title of {slug}"),
        subtitle: format!("Subtitle of {slug}"),
        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        claim: Claim {
            question: format!("Is {slug} real?"),
            rating: Rating::False,
            context: None,
        },
        content: vec![format!("Paragraph about {slug}.")],
    }
}

/// Scripted [`FactSource`].
#[derive(Default)]
pub(crate) struct StubSource {
    slugs: Mutex<Vec<String>>,
    articles: Mutex<HashMap<String, Article>>,
    failing_scrapes: Mutex<HashSet<String>>,
    listing_fails: Mutex<bool>,
}

impl StubSource {
    pub fn fail_scrape(&self, slug: &str) {
        self.failing_scrapes.lock().unwrap().insert(slug.into());
    }

    pub fn fail_listing(&self) {
        *self.listing_fails.lock().unwrap() = true;
    }
}

#[async_trait]
impl FactSource for StubSource {
    async fn latest_slugs(&self) -> Result<Vec<String>> {
        if *self.listing_fails.lock().unwrap() {
            return Err(CounterclaimError::Fetch("injected listing failure".into()));
        }
        Ok(self.slugs.lock().unwrap().clone())
    }

    async fn scrape_article(&self, slug: &str) -> Result<Article> {
        if self.failing_scrapes.lock().unwrap().contains(slug) {
            return Err(CounterclaimError::Fetch("injected scrape failure".into()));
        }
        self.articles
            .lock()
            .unwrap()
            .get(slug)
            .cloned()
            .ok_or_else(|| CounterclaimError::parse(format!("no scripted article for {slug}")))
    }
}

/// In-memory [`RecordStore`].
#[derive(Default)]
pub(crate) struct MemStore {
    articles: Mutex<HashMap<String, Article>>,
    spoofs: Mutex<HashMap<String, Spoof>>,
    failing_spoof_saves: Mutex<HashSet<String>>,
    failing_marks: Mutex<HashMap<String, usize>>,
}

impl MemStore {
    pub fn fail_save_spoof(&self, slug: &str) {
        self.failing_spoof_saves.lock().unwrap().insert(slug.into());
    }

    /// Fail the next `times` calls to `set_published` for this slug.
    pub fn fail_set_published_times(&self, slug: &str, times: usize) {
        self.failing_marks.lock().unwrap().insert(slug.into(), times);
    }

    pub fn seed_article(&self, article: Article) {
        self.articles
            .lock()
            .unwrap()
            .insert(article.slug.clone(), article);
    }

    pub fn seed_spoof(&self, spoof: Spoof) {
        self.spoofs
            .lock()
            .unwrap()
            .insert(spoof.slug.clone(), spoof);
    }

    pub fn spoof(&self, slug: &str) -> Option<Spoof> {
        self.spoofs.lock().unwrap().get(slug).cloned()
    }

    pub fn has_article(&self, slug: &str) -> bool {
        self.articles.lock().unwrap().contains_key(slug)
    }

    pub fn force_published(&self, slug: &str, published: bool) {
        if let Some(spoof) = self.spoofs.lock().unwrap().get_mut(slug) {
            spoof.published = published;
        }
    }
}

#[async_trait]
impl RecordStore for MemStore {
    async fn save_article(&self, article: &Article) -> Result<()> {
        let mut articles = self.articles.lock().unwrap();
        if articles.contains_key(&article.slug) {
            return Err(CounterclaimError::Storage(format!(
                "duplicate article {}",
                article.slug
            )));
        }
        articles.insert(article.slug.clone(), article.clone());
        Ok(())
    }

    async fn has_article(&self, slug: &str) -> Result<bool> {
        Ok(self.articles.lock().unwrap().contains_key(slug))
    }

    async fn article_slugs(&self) -> Result<HashSet<String>> {
        Ok(self.articles.lock().unwrap().keys().cloned().collect())
    }

    async fn save_spoof(&self, spoof: &Spoof) -> Result<()> {
        if self.failing_spoof_saves.lock().unwrap().contains(&spoof.slug) {
            return Err(CounterclaimError::Storage("injected save failure".into()));
        }
        self.spoofs
            .lock()
            .unwrap()
            .insert(spoof.slug.clone(), spoof.clone());
        Ok(())
    }

    async fn get_spoof(&self, slug: &str) -> Result<Option<Spoof>> {
        Ok(self.spoofs.lock().unwrap().get(slug).cloned())
    }

    async fn spoof_slugs(&self) -> Result<Vec<String>> {
        let mut slugs: Vec<String> = self.spoofs.lock().unwrap().keys().cloned().collect();
        slugs.sort();
        Ok(slugs)
    }

    async fn unpublished_spoofs(&self) -> Result<Vec<Spoof>> {
        let mut spoofs: Vec<Spoof> = self
            .spoofs
            .lock()
            .unwrap()
            .values()
            .filter(|s| !s.published)
            .cloned()
            .collect();
        spoofs.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(spoofs)
    }

    async fn set_published(&self, slug: &str, published: bool) -> Result<()> {
        {
            let mut failing = self.failing_marks.lock().unwrap();
            if let Some(remaining) = failing.get_mut(slug) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(CounterclaimError::Storage("injected mark failure".into()));
                }
            }
        }
        let mut spoofs = self.spoofs.lock().unwrap();
        match spoofs.get_mut(slug) {
            Some(spoof) => {
                spoof.published = published;
                Ok(())
            }
            None => Err(CounterclaimError::Storage(format!("no spoof {slug}"))),
        }
    }

    async fn latest_stubs(&self, limit: u32) -> Result<Vec<SpoofStub>> {
        let mut stubs: Vec<SpoofStub> = self
            .spoofs
            .lock()
            .unwrap()
            .values()
            .map(|s| SpoofStub {
                slug: s.slug.clone(),
                title: s.title.clone(),
                subtitle: s.subtitle.clone(),
                date: s.date,
            })
            .collect();
        stubs.sort_by(|a, b| b.date.cmp(&a.date).then(a.slug.cmp(&b.slug)));
        stubs.truncate(limit as usize);
        Ok(stubs)
    }
}

/// Negating transformer that can be scripted to fail for paragraphs
/// mentioning a token.
#[derive(Default)]
pub(crate) struct FlakySpoofer {
    failing_tokens: Mutex<HashSet<String>>,
}

impl FlakySpoofer {
    pub fn fail_for(&self, token: &str) {
        self.failing_tokens.lock().unwrap().insert(token.into());
    }
}

#[async_trait]
impl Spoofer for FlakySpoofer {
    async fn spoof(&self, content: &[String], _rating: Rating) -> Result<Vec<String>> {
        let tokens = self.failing_tokens.lock().unwrap();
        if content.iter().any(|p| tokens.iter().any(|t| p.contains(t.as_str()))) {
            return Err(CounterclaimError::Transform("injected transform failure".into()));
        }
        Ok(content.iter().map(|p| format!("NOT {p}")).collect())
    }
}

/// [`HtmlRenderer`] wrapper that can be scripted to fail for a slug.
pub(crate) struct FlakyRenderer {
    inner: HtmlRenderer,
    failing_slugs: Mutex<HashSet<String>>,
}

impl Default for FlakyRenderer {
    fn default() -> Self {
        Self {
            inner: HtmlRenderer,
            failing_slugs: Mutex::default(),
        }
    }
}

impl FlakyRenderer {
    pub fn fail_for(&self, slug: &str) {
        self.failing_slugs.lock().unwrap().insert(slug.into());
    }
}

impl Renderer for FlakyRenderer {
    fn render_spoof(&self, spoof: &Spoof) -> Result<Vec<u8>> {
        if self.failing_slugs.lock().unwrap().contains(&spoof.slug) {
            return Err(CounterclaimError::Render("injected render failure".into()));
        }
        self.inner.render_spoof(spoof)
    }

    fn render_index(&self, stubs: &[SpoofStub]) -> Result<Vec<u8>> {
        self.inner.render_index(stubs)
    }
}

/// [`MemoryPublisher`] wrapper that can fail the next N puts for a key.
#[derive(Default)]
pub(crate) struct FlakyPublisher {
    inner: MemoryPublisher,
    failing_puts: Mutex<HashMap<String, usize>>,
}

impl FlakyPublisher {
    pub fn fail_put_times(&self, key: &str, times: usize) {
        self.failing_puts.lock().unwrap().insert(key.into(), times);
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.get(key)
    }

    pub fn remove(&self, key: &str) {
        self.inner.remove(key);
    }
}

#[async_trait]
impl Publisher for FlakyPublisher {
    async fn exists(&self, key: &str) -> Result<bool> {
        self.inner.exists(key).await
    }

    async fn put(&self, key: &str, content: &[u8]) -> Result<()> {
        {
            let mut failing = self.failing_puts.lock().unwrap();
            if let Some(remaining) = failing.get_mut(key) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(CounterclaimError::Storage("injected put failure".into()));
                }
            }
        }
        self.inner.put(key, content).await
    }
}

/// Bundles the doubles and builds orchestrators over them.
pub(crate) struct Harness {
    pub source: Arc<StubSource>,
    pub store: Arc<MemStore>,
    pub spoofer: Arc<FlakySpoofer>,
    pub renderer: Arc<FlakyRenderer>,
    pub publisher: Arc<FlakyPublisher>,
}

impl Harness {
    /// Harness whose source lists the given slugs, newest-first, with a
    /// scripted article behind each. Dates descend with listing position
    /// so the recent index orders the same way as the listing.
    pub fn with_articles(slugs: &[&str]) -> Self {
        let source = StubSource::default();
        {
            let mut listing = source.slugs.lock().unwrap();
            let mut articles = source.articles.lock().unwrap();
            for (i, slug) in slugs.iter().enumerate() {
                let mut article = sample_article(slug);
                article.date = NaiveDate::from_ymd_opt(2024, 6, 28 - i as u32).unwrap();
                listing.push(slug.to_string());
                articles.insert(slug.to_string(), article);
            }
        }
        Self {
            source: Arc::new(source),
            store: Arc::new(MemStore::default()),
            spoofer: Arc::new(FlakySpoofer::default()),
            renderer: Arc::new(FlakyRenderer::default()),
            publisher: Arc::new(FlakyPublisher::default()),
        }
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            self.source.clone(),
            self.store.clone(),
            self.spoofer.clone(),
            self.renderer.clone(),
            self.publisher.clone(),
            21,
        )
    }
}
