//! Reconciliation stage: detect bookkeeping drift and repair it.
//!
//! The record store's `published` flag is a claim about the publication
//! target, and the target can lose artifacts (or a mark can fail after a
//! successful put). Reconciliation probes every spoof, demotes stale
//! claims, then republishes everything unpublished. Each pass only moves
//! state toward "published and marked"; repeated passes converge.

use std::collections::HashSet;

use tracing::{debug, info, instrument, warn};

use counterclaim_shared::Result;

use crate::progress::RunProgress;
use crate::report::ReconcileReport;
use crate::run::Orchestrator;

impl Orchestrator {
    /// One reconciliation pass: drift detection, then repair.
    #[instrument(skip_all)]
    pub(crate) async fn reconcile(&self, progress: &dyn RunProgress) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        progress.phase("reconcile");
        let slugs = self.store.spoof_slugs().await?;
        report.checked = slugs.len();

        for slug in slugs.iter().map(String::as_str) {
            match self.publisher.exists(slug).await {
                Ok(true) => {}
                Ok(false) => match self.store.get_spoof(slug).await {
                    // Marked published but the artifact is gone. Demote;
                    // the repair phase below picks it up.
                    Ok(Some(spoof)) if spoof.published => {
                        warn!(slug, "artifact missing from publication target");
                        report.drift_found += 1;
                        if let Err(e) = self.store.set_published(slug, false).await {
                            warn!(slug, error = %e, "failed to demote published flag");
                            report.failures += 1;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(slug, error = %e, "failed to read spoof, skipping");
                        report.failures += 1;
                    }
                },
                Err(e) => {
                    warn!(slug, error = %e, "existence probe failed, skipping");
                    report.failures += 1;
                }
            }
        }

        let unpublished = self.store.unpublished_spoofs().await?;
        for spoof in &unpublished {
            match self.publish_spoof(spoof).await {
                Ok(()) => {
                    debug!(slug = %spoof.slug, "spoof republished");
                    report.repaired += 1;
                }
                Err(e) => {
                    warn!(slug = %spoof.slug, error = %e, "repair failed, left for next pass");
                    report.failures += 1;
                }
            }
        }

        report.orphaned_articles = self.count_orphans().await?;
        if report.orphaned_articles > 0 {
            warn!(
                count = report.orphaned_articles,
                "articles recorded without a spoof"
            );
        }

        if report.drift_found > 0 || report.repaired > 0 {
            info!(
                checked = report.checked,
                drift_found = report.drift_found,
                repaired = report.repaired,
                "reconciliation repaired drift"
            );
        }
        Ok(report)
    }

    /// Articles with no spoof row, usually left behind by transform
    /// failures. Surfaced for operators, never auto-repaired: spoofing
    /// costs a transformer call and orphans are rescraped organically if
    /// the item reappears on the listing.
    async fn count_orphans(&self) -> Result<usize> {
        let articles = self.store.article_slugs().await?;
        let spoofed: HashSet<String> = self.store.spoof_slugs().await?.into_iter().collect();
        // A stray spoof whose article row was deleted externally must not
        // skew the count, so this is a set difference, not a length delta.
        Ok(articles
            .iter()
            .filter(|slug| !spoofed.contains(slug.as_str()))
            .count())
    }
}
