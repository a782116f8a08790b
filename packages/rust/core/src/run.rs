//! Run orchestrator: ingestion followed by reconciliation, once or on a
//! timer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use counterclaim_publish::Publisher;
use counterclaim_render::Renderer;
use counterclaim_shared::{Result, Spoof};
use counterclaim_source::FactSource;
use counterclaim_spoof::Spoofer;
use counterclaim_storage::RecordStore;

use crate::progress::RunProgress;
use crate::report::RunReport;

/// Publication key for the recent-items index.
pub const INDEX_KEY: &str = "latest";

/// Owns the pipeline collaborators and drives runs.
///
/// Items are processed one at a time on purpose: the transformer backend
/// is rate limited and a run has no deadline.
pub struct Orchestrator {
    pub(crate) source: Arc<dyn FactSource>,
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) spoofer: Arc<dyn Spoofer>,
    pub(crate) renderer: Arc<dyn Renderer>,
    pub(crate) publisher: Arc<dyn Publisher>,
    pub(crate) recent_limit: u32,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn FactSource>,
        store: Arc<dyn RecordStore>,
        spoofer: Arc<dyn Spoofer>,
        renderer: Arc<dyn Renderer>,
        publisher: Arc<dyn Publisher>,
        recent_limit: u32,
    ) -> Self {
        Self {
            source,
            store,
            spoofer,
            renderer,
            publisher,
            recent_limit,
        }
    }

    /// Execute one full run: ingest new items, then reconcile bookkeeping
    /// against the publication target.
    ///
    /// Per-item failures are counted in the report; only failures that
    /// prevent a whole stage from proceeding (listing fetch, record store
    /// enumeration) abort the run.
    pub async fn run_once(&self, progress: &dyn RunProgress) -> Result<RunReport> {
        self.run_inner(None, progress).await
    }

    #[instrument(skip_all, fields(run_id))]
    async fn run_inner(
        &self,
        shutdown: Option<&watch::Receiver<bool>>,
        progress: &dyn RunProgress,
    ) -> Result<RunReport> {
        let run_id = Uuid::now_v7();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        let started = Instant::now();

        let ingest = self.ingest(shutdown, progress).await?;
        let reconcile = self.reconcile(progress).await?;

        let report = RunReport {
            run_id,
            ingest,
            reconcile,
            elapsed: started.elapsed(),
        };
        info!(
            new_items = report.ingest.new_items,
            published = report.ingest.published,
            repaired = report.reconcile.repaired,
            failures = report.ingest.failures() + report.reconcile.failures,
            elapsed_secs = report.elapsed.as_secs_f64(),
            "run complete"
        );
        progress.done(&report);
        Ok(report)
    }

    /// Run on a fixed interval until `shutdown` flips to true.
    ///
    /// Runs never overlap: the next tick is not awaited until the current
    /// run finishes, and ticks that pile up behind a slow run are skipped.
    /// A failed run is logged and the loop keeps going.
    pub async fn run_scheduled(
        &self,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
        progress: &dyn RunProgress,
    ) -> Result<()> {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = timer.tick() => {}
                _ = shutdown.changed() => {}
            }
            if *shutdown.borrow() {
                info!("shutdown requested, stopping scheduler");
                return Ok(());
            }

            if let Err(e) = self.run_inner(Some(&shutdown), progress).await {
                warn!(error = %e, "run failed, waiting for next tick");
            }
        }
    }

    /// Render a spoof, hand it to the publication target, and mark it
    /// published. Used by reconciliation repair, where the three steps
    /// share one failure outcome.
    pub(crate) async fn publish_spoof(&self, spoof: &Spoof) -> Result<()> {
        let page = self.renderer.render_spoof(spoof)?;
        self.publisher.put(&spoof.slug, &page).await?;
        self.store.set_published(&spoof.slug, true).await
    }

    /// Republish the recent-items index.
    pub(crate) async fn publish_index(&self) -> Result<()> {
        let stubs = self.store.latest_stubs(self.recent_limit).await?;
        let page = self.renderer.render_index(&stubs)?;
        self.publisher.put(INDEX_KEY, &page).await
    }
}
