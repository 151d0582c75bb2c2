//! Per-country economic state.

use serde::{Deserialize, Serialize};
use tradesim_types::{Connection, CountryId};

/// One nation in the simulation.
///
/// All counters start at zero and `power_level` at 1 when a game begins.
/// `power_level` is derived from `towns + markets` and is refreshed by the
/// economic engine whenever either changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Stable 0-based identity.
    pub id: CountryId,
    /// Towns bought by this country.
    pub towns: u32,
    /// Town-equivalents granted by trade partners.
    pub markets: u32,
    /// Mines bought by this country.
    pub mines: u32,
    /// Derived tier, `1..=4` with the default rules.
    pub power_level: u8,
    /// Current currency. May go negative through importer upkeep.
    pub reserve: i64,
    /// Everything ever credited to this country.
    pub lifetime_earnings: i64,
    /// Successful connection purchases ever made (new edges and upgrades).
    pub connections_purchased: u32,
    /// Trust/threat score toward every country, indexed by [`CountryId`].
    /// The own slot is unused.
    pub perception: Vec<i64>,
    /// Outgoing connections in purchase order.
    pub connections: Vec<Connection>,
}

impl Country {
    /// A fresh country in a world of `country_count` countries.
    pub fn new(id: CountryId, country_count: usize) -> Self {
        Self {
            id,
            towns: 0,
            markets: 0,
            mines: 0,
            power_level: 1,
            reserve: 0,
            lifetime_earnings: 0,
            connections_purchased: 0,
            perception: vec![0; country_count],
            connections: Vec::new(),
        }
    }

    /// `towns + markets`, the quantity power levels are measured against.
    pub const fn size(&self) -> u32 {
        self.towns.saturating_add(self.markets)
    }

    /// Outgoing edge to `importer`, if any.
    pub fn connection_to(&self, importer: CountryId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.importer == importer)
    }

    /// Mutable outgoing edge to `importer`, if any.
    pub fn connection_to_mut(&mut self, importer: CountryId) -> Option<&mut Connection> {
        self.connections.iter_mut().find(|c| c.importer == importer)
    }

    /// Perception score toward `other` (0 when out of range).
    pub fn perception_of(&self, other: CountryId) -> i64 {
        self.perception.get(other.index()).copied().unwrap_or(0)
    }

    /// Credit `amount` to both the reserve and lifetime earnings.
    pub const fn credit(&mut self, amount: i64) {
        self.reserve = self.reserve.saturating_add(amount);
        self.lifetime_earnings = self.lifetime_earnings.saturating_add(amount);
    }

    /// Debit `amount` from the reserve. The reserve may go negative.
    pub const fn debit(&mut self, amount: i64) {
        self.reserve = self.reserve.saturating_sub(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_country_starts_empty() {
        let country = Country::new(CountryId::new(2), 4);
        assert_eq!(country.power_level, 1);
        assert_eq!(country.reserve, 0);
        assert_eq!(country.perception.len(), 4);
        assert!(country.connections.is_empty());
    }

    #[test]
    fn credit_tracks_lifetime_and_debit_does_not() {
        let mut country = Country::new(CountryId::new(0), 2);
        country.credit(10);
        country.debit(4);
        assert_eq!(country.reserve, 6);
        assert_eq!(country.lifetime_earnings, 10);
        country.debit(9);
        assert_eq!(country.reserve, -3);
    }
}
