//! Error types for counterclaim.
//!
//! Library crates use [`CounterclaimError`] via `thiserror`.
//! The app crate wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all counterclaim operations.
#[derive(Debug, thiserror::Error)]
pub enum CounterclaimError {
    /// Configuration loading or validation error. Fatal at startup,
    /// before any run is attempted.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to the fact-check source.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// DOM extraction error against a fetched page.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A verdict string outside the closed rating vocabulary.
    #[error("invalid rating: {rating}")]
    InvalidRating { rating: String },

    /// Content-inversion backend failure.
    #[error("transform error: {0}")]
    Transform(String),

    /// Persistence or read failure against the record store or the
    /// publication target.
    #[error("storage error: {0}")]
    Storage(String),

    /// Spoof or index artifact rendering error.
    #[error("render error: {0}")]
    Render(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CounterclaimError>;

impl CounterclaimError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an invalid-rating error carrying the offending string.
    pub fn invalid_rating(raw: impl Into<String>) -> Self {
        Self::InvalidRating { rating: raw.into() }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
