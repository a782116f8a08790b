//! Run reports: per-stage counters for one pipeline run.

use std::time::Duration;

use uuid::Uuid;

/// Counters for one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Slugs found on the listing page.
    pub discovered: usize,
    /// Slugs not yet in the record store.
    pub new_items: usize,
    /// Articles persisted this pass.
    pub stored: usize,
    /// Spoofs generated and persisted this pass.
    pub spoofed: usize,
    /// Spoofs rendered, published, and marked this pass.
    pub published: usize,
    /// Items lost to scrape failures.
    pub scrape_failures: usize,
    /// Items lost persisting the article.
    pub store_article_failures: usize,
    /// Items lost to transform failures.
    pub transform_failures: usize,
    /// Items lost persisting the spoof.
    pub store_spoof_failures: usize,
    /// Items lost rendering the spoof.
    pub render_failures: usize,
    /// Items whose artifact did not reach the publication target.
    pub publish_failures: usize,
    /// Items published whose bookkeeping mark failed afterwards.
    pub mark_failures: usize,
    /// Whether the recent-items index was republished.
    pub index_published: bool,
}

impl IngestReport {
    /// Total items lost at any stage this pass.
    pub fn failures(&self) -> usize {
        self.scrape_failures
            + self.store_article_failures
            + self.transform_failures
            + self.store_spoof_failures
            + self.render_failures
            + self.publish_failures
            + self.mark_failures
    }
}

/// Counters for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Spoof slugs probed against the publication target.
    pub checked: usize,
    /// Spoofs whose artifact was missing despite being marked published.
    pub drift_found: usize,
    /// Unpublished spoofs republished and marked this pass.
    pub repaired: usize,
    /// Probe or repair attempts that failed and were left for the next pass.
    pub failures: usize,
    /// Articles recorded without a spoof. Logged, never auto-repaired.
    pub orphaned_articles: usize,
}

/// The full report for one run: ingestion followed by reconciliation.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Unique id for this run, used to correlate log lines.
    pub run_id: Uuid,
    pub ingest: IngestReport,
    pub reconcile: ReconcileReport,
    pub elapsed: Duration,
}

impl RunReport {
    /// One-line human summary for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "run {}: {} discovered, {} new, {} published, {} repaired, {} failures in {:.1}s",
            self.run_id,
            self.ingest.discovered,
            self.ingest.new_items,
            self.ingest.published,
            self.reconcile.repaired,
            self.ingest.failures() + self.reconcile.failures,
            self.elapsed.as_secs_f64(),
        )
    }
}
