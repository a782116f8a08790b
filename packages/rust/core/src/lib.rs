//! Pipeline core: diffing, ingestion, reconciliation, and the run
//! orchestrator.
//!
//! The orchestrator wires five collaborators together behind trait
//! objects: a fact source, a record store, a content transformer, a
//! renderer, and a publication target. Each run is an ingestion pass
//! followed by a reconciliation pass.

pub mod diff;
mod ingest;
pub mod progress;
mod reconcile;
pub mod report;
pub mod run;

#[cfg(test)]
mod testsupport;

pub use progress::{RunProgress, SilentProgress};
pub use report::{IngestReport, ReconcileReport, RunReport};
pub use run::{INDEX_KEY, Orchestrator};
