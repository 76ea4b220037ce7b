//! Error types for ybk-pm
//!
//! Every variant aborts the run. Failures before the write step leave the
//! roster file untouched.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Roster file not found: {}", .0.display())]
    RosterNotFound(PathBuf),

    #[error("Roster file {} is malformed: {reason}", .path.display())]
    RosterMalformed { path: PathBuf, reason: String },

    /// Image host could not be queried
    #[error("Failed to list images: {0}")]
    Listing(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ybk_common::Error),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid photo mapping: {0}")]
    Mapping(String),
}

pub type Result<T> = std::result::Result<T, BatchError>;

impl BatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BatchError::Io {
            path: path.into(),
            source,
        }
    }
}
