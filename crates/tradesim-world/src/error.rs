//! Error types for the `tradesim-world` crate.

use tradesim_types::CountryId;

/// Errors that can occur during world-graph operations.
///
/// Unaffordable or ineligible actions are never errors; these variants only
/// signal identifiers that do not belong to the world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A country index is outside the world.
    #[error("country not found: {0}")]
    CountryNotFound(CountryId),

    /// The exporter has no connection to the importer.
    #[error("no connection from {exporter} to {importer}")]
    ConnectionNotFound {
        /// Owner of the missing edge.
        exporter: CountryId,
        /// Importer of the missing edge.
        importer: CountryId,
    },
}
