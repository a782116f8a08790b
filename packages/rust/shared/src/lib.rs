//! Shared types, error model, and configuration for counterclaim.
//!
//! This crate is the foundation depended on by all other counterclaim crates.
//! It provides:
//! - [`CounterclaimError`], the unified error type
//! - Domain types ([`Rating`], [`Article`], [`Spoof`], [`SpoofStub`])
//! - Configuration ([`AppConfig`], config loading and validation)

pub mod config;
pub mod error;
pub mod rating;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, PublishConfig, PublisherKind, RunConfig, SourceConfig, SpooferConfig, SpooferKind,
    StorageConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    validate_config,
};
pub use error::{CounterclaimError, Result};
pub use rating::{Rating, VOCABULARY};
pub use types::{Article, Claim, Spoof, SpoofStub};
