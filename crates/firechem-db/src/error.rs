//! Dataset loading errors.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Invalid record: {0}")]
    Invalid(String),
}
