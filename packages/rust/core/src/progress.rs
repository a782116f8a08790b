//! Progress callback for reporting run status.

use crate::report::RunReport;

/// Progress callback invoked by the orchestrator during a run.
pub trait RunProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called as each new item begins processing.
    fn item(&self, slug: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl RunProgress for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn item(&self, _slug: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &RunReport) {}
}
