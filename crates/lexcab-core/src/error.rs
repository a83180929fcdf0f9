use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Source read failed: {0}")]
    Source(String),

    #[error("Failed to write index artifact {path}: {reason}")]
    ArtifactWrite { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a persisted index could not be loaded. Every variant is recoverable by a rebuild.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("index artifact not found")]
    Missing,

    #[error("index artifact unreadable: {0}")]
    Unreadable(#[source] std::io::Error),

    #[error("index artifact corrupt: {0}")]
    Corrupt(String),

    #[error("index artifact incompatible: {0}")]
    Incompatible(String),
}
