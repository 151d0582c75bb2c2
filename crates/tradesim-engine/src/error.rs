//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of a run so that `main` can
//! propagate with `?` and attach context through `anyhow`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: tradesim_core::ConfigError,
    },

    /// A game failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: tradesim_core::RunnerError,
    },

    /// Writing the Q-table failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: tradesim_store::StoreError,
    },

    /// The simulation task panicked or was cancelled.
    #[error("simulation task failed: {message}")]
    Task {
        /// Description of the join failure.
        message: String,
    },

    /// The run summary could not be encoded.
    #[error("summary encoding failed: {source}")]
    Summary {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
