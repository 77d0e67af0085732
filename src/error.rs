//! Error types shared across the crate

use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or writing the durable snapshot slot
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access snapshot at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Failures touching the in-memory game state
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to lock game state: {0}")]
    Poisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for StateError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        StateError::Poisoned(e.to_string())
    }
}
