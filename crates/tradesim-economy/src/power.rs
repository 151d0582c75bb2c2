//! Power level derivation and the connection cap it implies.

use tracing::debug;
use tradesim_types::CountryId;
use tradesim_world::{World, WorldError};

/// Recompute `power_level` from `towns + markets`. Returns the new level.
///
/// # Errors
///
/// Returns [`WorldError::CountryNotFound`] when `id` is not in the world.
pub fn find_power_level(world: &mut World, id: CountryId) -> Result<u8, WorldError> {
    let size = world.country(id)?.size();
    let level = world.rules().power_level_for(size);
    world.country_mut(id)?.power_level = level;
    Ok(level)
}

/// Drop outgoing edges beyond the cap of the country's current power level.
///
/// Lowest-level edges go first; among equal levels the newest goes first.
/// Returns how many edges were dropped.
///
/// # Errors
///
/// Returns [`WorldError::CountryNotFound`] when `id` is not in the world.
pub fn enforce_connection_cap(world: &mut World, id: CountryId) -> Result<usize, WorldError> {
    let cap = {
        let country = world.country(id)?;
        world.rules().connection_cap(country.power_level)
    };
    let country = world.country_mut(id)?;
    let mut dropped = 0_usize;

    while country.connections.len() > cap {
        let victim = country
            .connections
            .iter()
            .enumerate()
            .min_by_key(|(position, edge)| (edge.level, core::cmp::Reverse(*position)))
            .map(|(position, _)| position);
        let Some(position) = victim else {
            break;
        };
        let edge = country.connections.remove(position);
        dropped = dropped.saturating_add(1);
        debug!(
            exporter = %id,
            importer = %edge.importer,
            level = edge.level,
            cap,
            "Connection dropped after power level fell"
        );
    }

    Ok(dropped)
}

/// Recompute every power level, then enforce every cap.
///
/// Called after each applied action so that no country consults a stale
/// level later in the same turn.
///
/// # Errors
///
/// Propagates [`WorldError`] from the per-country helpers.
pub fn refresh_all(world: &mut World) -> Result<(), WorldError> {
    let ids: Vec<CountryId> = world.ids().collect();
    for &id in &ids {
        find_power_level(world, id)?;
    }
    for &id in &ids {
        enforce_connection_cap(world, id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tradesim_types::Connection;
    use tradesim_world::EconomyRules;

    use super::*;

    #[test]
    fn power_level_counts_thresholds_met() {
        let mut world = World::new(1, EconomyRules::default());
        let id = CountryId::new(0);
        for (towns, markets, expected) in [(0, 0, 1), (3, 2, 2), (9, 0, 2), (4, 6, 3), (10, 6, 4)] {
            if let Ok(country) = world.country_mut(id) {
                country.towns = towns;
                country.markets = markets;
            }
            assert_eq!(find_power_level(&mut world, id).ok(), Some(expected));
        }
    }

    #[test]
    fn cap_drops_lowest_then_newest() {
        let mut world = World::new(4, EconomyRules::default());
        let id = CountryId::new(0);
        if let Ok(country) = world.country_mut(id) {
            country.power_level = 2;
            country.connections = vec![
                Connection {
                    importer: CountryId::new(1),
                    level: 2,
                    blockaded: false,
                },
                Connection::new(CountryId::new(2)),
                Connection::new(CountryId::new(3)),
            ];
        }
        assert_eq!(enforce_connection_cap(&mut world, id).ok(), Some(2));
        let remaining: Vec<usize> = world
            .country(id)
            .map(|c| c.connections.iter().map(|e| e.importer.index()).collect())
            .unwrap_or_default();
        assert_eq!(remaining, vec![1]);
    }

    #[test]
    fn unknown_country_is_an_error() {
        let mut world = World::new(1, EconomyRules::default());
        assert!(find_power_level(&mut world, CountryId::new(5)).is_err());
    }
}
