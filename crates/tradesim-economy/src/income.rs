//! Per-turn income.
//!
//! A country earns `mines + power_level`, plus for every outgoing connection
//! that is not blockaded `mines / 2 + (importer.towns + importer.markets) /
//! max(1, 6 - level)`. Collecting income also charges every importer an
//! upkeep equal to the connection level, whether or not the edge is
//! blockaded.

use tradesim_types::CountryId;
use tradesim_world::{World, WorldError};

/// Income `id` would earn this turn. Mutates nothing.
///
/// # Errors
///
/// Returns [`WorldError::CountryNotFound`] for an unknown exporter or importer.
pub fn potential_income(world: &World, id: CountryId) -> Result<i64, WorldError> {
    let country = world.country(id)?;
    let mines = i64::from(country.mines);
    let mut income = mines.saturating_add(i64::from(country.power_level));

    for edge in &country.connections {
        if world.is_blockaded(id, edge) {
            continue;
        }
        let importer = world.country(edge.importer)?;
        let importer_size = i64::from(importer.size());
        let mine_share = mines.div_euclid(2);
        let market_share = importer_size.div_euclid(world.rules().trade_divisor(edge.level));
        income = income
            .saturating_add(mine_share)
            .saturating_add(market_share);
    }

    Ok(income)
}

/// Credit this turn's income to `id` and charge upkeep to its importers.
///
/// Returns the amount credited.
///
/// # Errors
///
/// Returns [`WorldError::CountryNotFound`] for an unknown exporter or importer.
pub fn collect_income(world: &mut World, id: CountryId) -> Result<i64, WorldError> {
    let income = potential_income(world, id)?;
    let upkeep: Vec<(CountryId, i64)> = world
        .country(id)?
        .connections
        .iter()
        .map(|edge| (edge.importer, i64::from(edge.level)))
        .collect();

    for (importer, level) in upkeep {
        world.country_mut(importer)?.debit(level);
    }
    world.country_mut(id)?.credit(income);

    Ok(income)
}

/// Compute income, committing it only when `apply` is true.
///
/// # Errors
///
/// Propagates [`WorldError`] from [`potential_income`] and [`collect_income`].
pub fn generate_money(world: &mut World, id: CountryId, apply: bool) -> Result<i64, WorldError> {
    if apply {
        collect_income(world, id)
    } else {
        potential_income(world, id)
    }
}
