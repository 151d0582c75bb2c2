//! Error types for Q-table persistence.

use std::path::PathBuf;

/// Errors that can occur while reading or writing a Q-table file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading, writing, or renaming the file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not a JSON object of value arrays.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
