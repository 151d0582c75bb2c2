//! Core entity structs shared across crates.

use serde::{Deserialize, Serialize};

use crate::ids::CountryId;

/// Highest level a trade connection can be upgraded to.
pub const MAX_CONNECTION_LEVEL: u8 = 3;

/// A directed trade edge owned by the exporting country.
///
/// At most one connection exists per ordered (exporter, importer) pair;
/// buying again upgrades `level` in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// The importing country.
    pub importer: CountryId,
    /// Trade level, `1..=MAX_CONNECTION_LEVEL`.
    pub level: u8,
    /// Set by the importer to suspend the edge.
    pub blockaded: bool,
}

impl Connection {
    /// A fresh, unblockaded level-1 connection to `importer`.
    pub const fn new(importer: CountryId) -> Self {
        Self {
            importer,
            level: 1,
            blockaded: false,
        }
    }

    /// Whether the connection can still be upgraded.
    pub const fn can_upgrade(&self) -> bool {
        self.level < MAX_CONNECTION_LEVEL
    }
}
