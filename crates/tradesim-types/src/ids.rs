//! Index-based identifiers for countries.
//!
//! Countries never hold references to one another. Every cross-country
//! relationship stores a [`CountryId`] and resolves it against the shared
//! world each time it is needed.

use serde::{Deserialize, Serialize};

/// Stable, 0-based identifier of a country within one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(pub usize);

impl CountryId {
    /// Create an identifier from a 0-based index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the 0-based index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for CountryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for CountryId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}
