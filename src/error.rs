//! Errors for the fallible edges: JSON and file IO.
//!
//! The coordination state itself never fails; missing keys, stale indices
//! and inactive selection targets are handled by fallback instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmsError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Contents JSON that parsed but is not an object of strings.
    #[error("contents must be a JSON object of strings: {0}")]
    InvalidContents(String),
}

pub type Result<T> = std::result::Result<T, CmsError>;
