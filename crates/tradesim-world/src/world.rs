//! The shared world of one game: every country and the trade graph.
//!
//! Connections are stored on their exporter. Inbound views, reciprocity, and
//! blockade checks are answered here by scanning the other countries, which
//! keeps a single owner for every edge.

use serde::{Deserialize, Serialize};
use tracing::debug;
use tradesim_types::{Connection, CountryId};

use crate::country::Country;
use crate::error::WorldError;
use crate::rules::{BlockadeRule, EconomyRules};

/// The country list and its connection graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    countries: Vec<Country>,
    rules: EconomyRules,
}

impl World {
    /// A fresh world of `country_count` countries with all economic state zeroed.
    pub fn new(country_count: usize, rules: EconomyRules) -> Self {
        let countries = (0..country_count)
            .map(|index| Country::new(CountryId::new(index), country_count))
            .collect();
        debug!(country_count, "World created");
        Self { countries, rules }
    }

    /// The economy rule book.
    pub const fn rules(&self) -> &EconomyRules {
        &self.rules
    }

    /// Number of countries.
    pub const fn len(&self) -> usize {
        self.countries.len()
    }

    /// Whether the world has no countries.
    pub const fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// All country ids in processing order.
    pub fn ids(&self) -> impl Iterator<Item = CountryId> + use<> {
        (0..self.countries.len()).map(CountryId::new)
    }

    /// All countries in index order.
    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    /// Look up a country.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CountryNotFound`] when `id` is out of range.
    pub fn country(&self, id: CountryId) -> Result<&Country, WorldError> {
        self.countries
            .get(id.index())
            .ok_or(WorldError::CountryNotFound(id))
    }

    /// Look up a country mutably.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CountryNotFound`] when `id` is out of range.
    pub fn country_mut(&mut self, id: CountryId) -> Result<&mut Country, WorldError> {
        self.countries
            .get_mut(id.index())
            .ok_or(WorldError::CountryNotFound(id))
    }

    /// The edge `exporter -> importer`, if it exists.
    pub fn connection(&self, exporter: CountryId, importer: CountryId) -> Option<&Connection> {
        self.countries
            .get(exporter.index())
            .and_then(|c| c.connection_to(importer))
    }

    /// Whether `exporter` has an edge to `importer`.
    pub fn has_connection(&self, exporter: CountryId, importer: CountryId) -> bool {
        self.connection(exporter, importer).is_some()
    }

    /// Whether both directions `a -> b` and `b -> a` exist.
    pub fn is_reciprocal(&self, a: CountryId, b: CountryId) -> bool {
        self.has_connection(a, b) && self.has_connection(b, a)
    }

    /// Every edge aimed at `importer`, paired with its exporter, in exporter order.
    pub fn inbound(&self, importer: CountryId) -> Vec<(CountryId, Connection)> {
        self.countries
            .iter()
            .filter_map(|exporter| {
                exporter
                    .connection_to(importer)
                    .map(|edge| (exporter.id, *edge))
            })
            .collect()
    }

    /// Whether the edge `exporter -> edge.importer` earns nothing this turn.
    pub fn is_blockaded(&self, exporter: CountryId, edge: &Connection) -> bool {
        match self.rules.blockade_rule {
            BlockadeRule::EdgeFlag => edge.blockaded,
            BlockadeRule::Reciprocal => self
                .connection(edge.importer, exporter)
                .is_some_and(|back| back.blockaded),
        }
    }

    /// Ids of every country other than `id`.
    pub fn others(&self, id: CountryId) -> Vec<CountryId> {
        self.ids().filter(|&other| other != id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect(world: &mut World, exporter: usize, importer: usize, blockaded: bool) {
        if let Ok(country) = world.country_mut(CountryId::new(exporter)) {
            country.connections.push(Connection {
                importer: CountryId::new(importer),
                level: 1,
                blockaded,
            });
        }
    }

    #[test]
    fn new_world_has_indexed_countries() {
        let world = World::new(3, EconomyRules::default());
        assert_eq!(world.len(), 3);
        let ids: Vec<usize> = world.ids().map(CountryId::index).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(world.country(CountryId::new(3)).is_err());
    }

    #[test]
    fn inbound_lists_exporters_in_order() {
        let mut world = World::new(3, EconomyRules::default());
        connect(&mut world, 2, 0, false);
        connect(&mut world, 1, 0, true);
        let inbound: Vec<usize> = world
            .inbound(CountryId::new(0))
            .iter()
            .map(|(exporter, _)| exporter.index())
            .collect();
        assert_eq!(inbound, vec![1, 2]);
    }

    #[test]
    fn reciprocal_rule_reads_return_edge() {
        let mut world = World::new(2, EconomyRules::default());
        connect(&mut world, 0, 1, false);
        connect(&mut world, 1, 0, true);
        let edge = *world
            .connection(CountryId::new(0), CountryId::new(1))
            .unwrap_or(&Connection::new(CountryId::new(1)));
        assert!(world.is_blockaded(CountryId::new(0), &edge));
        assert!(world.is_reciprocal(CountryId::new(0), CountryId::new(1)));
    }

    #[test]
    fn edge_flag_rule_reads_own_flag() {
        let rules = EconomyRules {
            blockade_rule: BlockadeRule::EdgeFlag,
            ..EconomyRules::default()
        };
        let mut world = World::new(2, rules);
        connect(&mut world, 0, 1, false);
        connect(&mut world, 1, 0, true);
        let edge = Connection::new(CountryId::new(1));
        assert!(!world.is_blockaded(CountryId::new(0), &edge));
    }
}
