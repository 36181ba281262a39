//! Error types for policy graph operations.
//!
//! [`PolicyGraphError`] is the single error surfaced by the engine's public
//! entry points. Building a topology and computing geometry never fail; only
//! configuration handling and export do.

use std::io;

use thiserror::Error;

use crate::snapshot::ParseError;

/// The main error type for policy graph operations.
///
/// The `Snapshot` variant keeps the rejected document so callers can point
/// at the offending position.
#[derive(Debug, Error)]
pub enum PolicyGraphError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Snapshot error: {err}")]
    Snapshot { err: ParseError, src: String },

    #[error("Style error: {0}")]
    Style(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for PolicyGraphError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl PolicyGraphError {
    /// Creates a `Snapshot` error with the document it was decoded from.
    pub fn new_snapshot_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Snapshot {
            err,
            src: src.into(),
        }
    }
}
