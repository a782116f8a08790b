//! Ingestion stage: discover new fact checks, invert them, publish them.

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use counterclaim_shared::Result;

use crate::diff::unknown_slugs;
use crate::progress::RunProgress;
use crate::report::IngestReport;
use crate::run::Orchestrator;

impl Orchestrator {
    /// One ingestion pass.
    ///
    /// Each new item moves through scrape, store, transform, and publish
    /// independently: a failure at any step drops that item from the rest
    /// of the pass, is counted, and the next item proceeds. Nothing is
    /// retried within a pass; the next run picks dropped items up again
    /// because only stored articles leave the unknown set.
    #[instrument(skip_all)]
    pub(crate) async fn ingest(
        &self,
        shutdown: Option<&watch::Receiver<bool>>,
        progress: &dyn RunProgress,
    ) -> Result<IngestReport> {
        progress.phase("discover");
        let candidates = self.source.latest_slugs().await?;
        let known = self.store.article_slugs().await?;
        let new_items = unknown_slugs(&candidates, &known);

        let mut report = IngestReport {
            discovered: candidates.len(),
            new_items: new_items.len(),
            ..IngestReport::default()
        };
        info!(
            discovered = report.discovered,
            new_items = report.new_items,
            "listing scraped"
        );

        progress.phase("ingest");
        let total = new_items.len();
        for (i, slug) in new_items.iter().enumerate() {
            if let Some(rx) = shutdown {
                if *rx.borrow() {
                    info!(remaining = total - i, "shutdown requested, stopping ingestion");
                    break;
                }
            }
            progress.item(slug, i + 1, total);
            self.ingest_item(slug, &mut report).await;
        }

        // The index reflects whatever is stored now, including items from
        // earlier runs.
        match self.publish_index().await {
            Ok(()) => {
                report.index_published = true;
                debug!("recent-items index republished");
            }
            Err(e) => warn!(error = %e, "failed to publish recent-items index"),
        }

        Ok(report)
    }

    /// Move one new item through the pipeline, updating counters.
    async fn ingest_item(&self, slug: &str, report: &mut IngestReport) {
        let article = match self.source.scrape_article(slug).await {
            Ok(article) => article,
            Err(e) => {
                warn!(slug, error = %e, "scrape failed, skipping item");
                report.scrape_failures += 1;
                return;
            }
        };

        if let Err(e) = self.store.save_article(&article).await {
            warn!(slug, error = %e, "storing article failed, skipping item");
            report.store_article_failures += 1;
            return;
        }
        report.stored += 1;

        let spoofed_content = match self
            .spoofer
            .spoof(&article.content, article.claim.rating)
            .await
        {
            Ok(content) => content,
            Err(e) => {
                warn!(slug, error = %e, "transform failed, article stored without a spoof");
                report.transform_failures += 1;
                return;
            }
        };

        let spoof = article.to_spoof(spoofed_content);
        if let Err(e) = self.store.save_spoof(&spoof).await {
            warn!(slug, error = %e, "storing spoof failed");
            report.store_spoof_failures += 1;
            return;
        }
        report.spoofed += 1;

        let page = match self.renderer.render_spoof(&spoof) {
            Ok(page) => page,
            Err(e) => {
                warn!(slug, error = %e, "render failed, spoof left unpublished");
                report.render_failures += 1;
                return;
            }
        };

        if let Err(e) = self.publisher.put(slug, &page).await {
            // The spoof stays marked unpublished; reconciliation
            // republishes it.
            warn!(slug, error = %e, "publishing failed, left for reconciliation");
            report.publish_failures += 1;
            return;
        }

        match self.store.set_published(slug, true).await {
            Ok(()) => {
                report.published += 1;
                debug!(slug, rating = %spoof.claim.rating, "item published");
            }
            Err(e) => {
                // The artifact is live but bookkeeping says otherwise.
                // Reconciliation republishes idempotently and re-marks.
                warn!(slug, error = %e, "mark-published failed, left for reconciliation");
                report.mark_failures += 1;
            }
        }
    }
}
