//! Action primitives.
//!
//! Each primitive is a self-contained state transition guarded by an
//! affordability and eligibility check. A failed check returns
//! [`ActionOutcome::Rejected`] and leaves the world untouched; only unknown
//! country ids surface as [`WorldError`].

use rand::Rng;
use tradesim_types::{ActionOutcome, Connection, CountryId, RejectionReason, Target};
use tradesim_world::{World, WorldError};

use super::targeting;

const fn rejected(reason: RejectionReason) -> ActionOutcome {
    ActionOutcome::Rejected { reason }
}

/// Buy a mine: 3 for the first, 7 thereafter.
///
/// # Errors
///
/// Returns [`WorldError::CountryNotFound`] when `actor` is unknown.
pub fn purchase_mine(world: &mut World, actor: CountryId) -> Result<ActionOutcome, WorldError> {
    let cost = world.rules().next_mine_cost(world.country(actor)?.mines);
    let country = world.country_mut(actor)?;
    if country.reserve < cost {
        return Ok(rejected(RejectionReason::InsufficientReserve));
    }
    country.debit(cost);
    country.mines = country.mines.saturating_add(1);
    Ok(ActionOutcome::Applied { cost })
}

/// Buy a town at a cost equal to the current power level.
///
/// # Errors
///
/// Returns [`WorldError::CountryNotFound`] when `actor` is unknown.
pub fn purchase_town(world: &mut World, actor: CountryId) -> Result<ActionOutcome, WorldError> {
    let country = world.country_mut(actor)?;
    let cost = i64::from(country.power_level);
    if country.reserve < cost {
        return Ok(rejected(RejectionReason::InsufficientReserve));
    }
    country.debit(cost);
    country.towns = country.towns.saturating_add(1);
    Ok(ActionOutcome::Applied { cost })
}

/// Open a connection to, or upgrade the existing connection with, an importer.
///
/// The first purchase a country ever makes costs a flat 3; every later one
/// costs `6 * level` of the resulting edge. New edges respect the connection
/// cap. On success the importer receives the trade subsidy: reserve, lifetime
/// earnings, and one market.
///
/// # Errors
///
/// Returns [`WorldError::CountryNotFound`] when `actor` is unknown.
pub fn purchase_connection<R>(
    world: &mut World,
    actor: CountryId,
    target: Target,
    rng: &mut R,
) -> Result<ActionOutcome, WorldError>
where
    R: Rng + ?Sized,
{
    let importer = {
        let country = world.country(actor)?;
        let others = world.others(actor);
        let purchasable = targeting::purchasable_importers(world, country);
        let resolved = targeting::resolve(
            actor,
            target,
            &others,
            &others,
            |_, rng| targeting::pick_importer(world, country, &purchasable, rng),
            rng,
        );
        match resolved {
            Ok(importer) => importer,
            Err(reason) => return Ok(rejected(reason)),
        }
    };

    let rules = world.rules().clone();
    let country = world.country(actor)?;
    let existing_level = country.connection_to(importer).map(|edge| edge.level);

    let new_level = match existing_level {
        Some(level) if level >= tradesim_types::MAX_CONNECTION_LEVEL => {
            return Ok(rejected(RejectionReason::ConnectionAtMaxLevel));
        }
        Some(level) => level.saturating_add(1),
        None => {
            if country.connections.len() >= rules.connection_cap(country.power_level) {
                return Ok(rejected(RejectionReason::ConnectionCapReached));
            }
            1
        }
    };

    let cost = rules.connection_cost(country.connections_purchased, new_level);
    if country.reserve < cost {
        return Ok(rejected(RejectionReason::InsufficientReserve));
    }

    let country = world.country_mut(actor)?;
    country.debit(cost);
    country.connections_purchased = country.connections_purchased.saturating_add(1);
    match country.connection_to_mut(importer) {
        Some(edge) => edge.level = new_level,
        None => country.connections.push(Connection::new(importer)),
    }

    let partner = world.country_mut(importer)?;
    partner.credit(rules.importer_bonus);
    partner.markets = partner.markets.saturating_add(rules.importer_market_bonus);

    Ok(ActionOutcome::Applied { cost })
}

/// Drop one outgoing connection. Free.
///
/// # Errors
///
/// Returns [`WorldError::CountryNotFound`] when `actor` is unknown.
pub fn remove_connection<R>(
    world: &mut World,
    actor: CountryId,
    target: Target,
    rng: &mut R,
) -> Result<ActionOutcome, WorldError>
where
    R: Rng + ?Sized,
{
    let importer = {
        let country = world.country(actor)?;
        let current: Vec<CountryId> = country.connections.iter().map(|e| e.importer).collect();
        let resolved = targeting::resolve(
            actor,
            target,
            &current,
            &current,
            |eligible, rng| targeting::pick_edge_to_drop(world, country, eligible, rng),
            rng,
        );
        match resolved {
            Ok(importer) => importer,
            Err(reason) => return Ok(rejected(reason)),
        }
    };

    world
        .country_mut(actor)?
        .connections
        .retain(|edge| edge.importer != importer);
    Ok(ActionOutcome::Applied { cost: 0 })
}

/// Blockade one unblockaded inbound connection.
///
/// Costs 3 and reduces the exporter's markets by the edge level, floored at 0.
///
/// # Errors
///
/// Returns [`WorldError::CountryNotFound`] when `actor` is unknown.
pub fn purchase_blockade<R>(
    world: &mut World,
    actor: CountryId,
    target: Target,
    rng: &mut R,
) -> Result<ActionOutcome, WorldError>
where
    R: Rng + ?Sized,
{
    let cost = world.rules().blockade_cost;
    let exporter = {
        let country = world.country(actor)?;
        let open = targeting::inbound_exporters(world, actor, false);
        if open.is_empty() {
            return Ok(rejected(RejectionReason::NoEligibleTarget));
        }
        let resolved = targeting::resolve(
            actor,
            target,
            &open,
            &open,
            |eligible, rng| targeting::pick_blockade(country, eligible, rng),
            rng,
        );
        let exporter = match resolved {
            Ok(exporter) => exporter,
            Err(reason) => return Ok(rejected(reason)),
        };
        if country.reserve < cost {
            return Ok(rejected(RejectionReason::InsufficientReserve));
        }
        exporter
    };

    let source = world.country_mut(exporter)?;
    let level = match source.connection_to_mut(actor) {
        Some(edge) => {
            edge.blockaded = true;
            edge.level
        }
        None => {
            return Err(WorldError::ConnectionNotFound {
                exporter,
                importer: actor,
            });
        }
    };
    source.markets = source.markets.saturating_sub(u32::from(level));

    world.country_mut(actor)?.debit(cost);
    Ok(ActionOutcome::Applied { cost })
}

/// Lift a blockade on one inbound connection. Free.
///
/// Restores the exporter's markets by the edge level.
///
/// # Errors
///
/// Returns [`WorldError::CountryNotFound`] when `actor` is unknown.
pub fn remove_blockade<R>(
    world: &mut World,
    actor: CountryId,
    target: Target,
    rng: &mut R,
) -> Result<ActionOutcome, WorldError>
where
    R: Rng + ?Sized,
{
    let exporter = {
        let country = world.country(actor)?;
        let blocked = targeting::inbound_exporters(world, actor, true);
        let resolved = targeting::resolve(
            actor,
            target,
            &blocked,
            &blocked,
            |eligible, rng| targeting::pick_release(country, eligible, rng),
            rng,
        );
        match resolved {
            Ok(exporter) => exporter,
            Err(reason) => return Ok(rejected(reason)),
        }
    };

    let source = world.country_mut(exporter)?;
    let level = match source.connection_to_mut(actor) {
        Some(edge) => {
            edge.blockaded = false;
            edge.level
        }
        None => {
            return Err(WorldError::ConnectionNotFound {
                exporter,
                importer: actor,
            });
        }
    };
    source.markets = source.markets.saturating_add(u32::from(level));
    Ok(ActionOutcome::Applied { cost: 0 })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tradesim_world::{Country, EconomyRules};

    use super::*;

    fn id(index: usize) -> CountryId {
        CountryId::new(index)
    }

    fn get(world: &World, index: usize) -> Country {
        world
            .country(id(index))
            .ok()
            .cloned()
            .unwrap_or_else(|| Country::new(id(index), 0))
    }

    /// A world where country 0 has enough power and money to trade.
    fn ready_world(count: usize) -> World {
        let mut world = World::new(count, EconomyRules::default());
        if let Ok(country) = world.country_mut(id(0)) {
            country.towns = 16;
            country.power_level = 4;
            country.reserve = 100;
        }
        world
    }

    #[test]
    fn mine_costs_three_then_seven() {
        let mut world = World::new(1, EconomyRules::default());
        if let Ok(country) = world.country_mut(id(0)) {
            country.reserve = 12;
        }
        assert_eq!(
            purchase_mine(&mut world, id(0)).ok(),
            Some(ActionOutcome::Applied { cost: 3 })
        );
        assert_eq!(
            purchase_mine(&mut world, id(0)).ok(),
            Some(ActionOutcome::Applied { cost: 7 })
        );
        assert_eq!(
            purchase_mine(&mut world, id(0)).ok(),
            Some(ActionOutcome::Rejected {
                reason: RejectionReason::InsufficientReserve
            })
        );
        assert_eq!(get(&world, 0).mines, 2);
        assert_eq!(get(&world, 0).reserve, 2);
    }

    #[test]
    fn town_costs_power_level() {
        let mut world = World::new(1, EconomyRules::default());
        if let Ok(country) = world.country_mut(id(0)) {
            country.reserve = 5;
            country.power_level = 3;
        }
        assert_eq!(
            purchase_town(&mut world, id(0)).ok(),
            Some(ActionOutcome::Applied { cost: 3 })
        );
        assert_eq!(get(&world, 0).towns, 1);
    }

    #[test]
    fn connection_pricing_first_second_upgrade() {
        let mut world = ready_world(3);
        let mut rng = StdRng::seed_from_u64(1);

        let first = purchase_connection(&mut world, id(0), Target::Country(id(1)), &mut rng);
        assert_eq!(first.ok(), Some(ActionOutcome::Applied { cost: 3 }));

        let second = purchase_connection(&mut world, id(0), Target::Country(id(2)), &mut rng);
        assert_eq!(second.ok(), Some(ActionOutcome::Applied { cost: 6 }));

        let upgrade = purchase_connection(&mut world, id(0), Target::Country(id(1)), &mut rng);
        assert_eq!(upgrade.ok(), Some(ActionOutcome::Applied { cost: 12 }));

        let exporter = get(&world, 0);
        assert_eq!(exporter.connections.len(), 2);
        assert_eq!(exporter.connection_to(id(1)).map(|e| e.level), Some(2));
        assert_eq!(exporter.reserve, 100 - 3 - 6 - 12);
    }

    #[test]
    fn every_purchase_subsidizes_importer() {
        let mut world = ready_world(2);
        let mut rng = StdRng::seed_from_u64(1);
        for expected_markets in 1..=3_u32 {
            let before = get(&world, 1);
            let outcome = purchase_connection(&mut world, id(0), Target::Country(id(1)), &mut rng);
            assert!(matches!(outcome, Ok(ActionOutcome::Applied { .. })));
            let after = get(&world, 1);
            assert_eq!(after.markets, before.markets + 1);
            assert_eq!(after.markets, expected_markets);
            assert_eq!(after.reserve, before.reserve + 3);
            assert_eq!(after.lifetime_earnings, before.lifetime_earnings + 3);
        }
    }

    #[test]
    fn level_three_edge_rejects_upgrade() {
        let mut world = ready_world(2);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..3 {
            let _ = purchase_connection(&mut world, id(0), Target::Country(id(1)), &mut rng);
        }
        let before = world.clone();
        let outcome = purchase_connection(&mut world, id(0), Target::Country(id(1)), &mut rng);
        assert_eq!(
            outcome.ok(),
            Some(ActionOutcome::Rejected {
                reason: RejectionReason::ConnectionAtMaxLevel
            })
        );
        assert_eq!(world, before);
    }

    #[test]
    fn level_one_power_cannot_connect() {
        let mut world = World::new(2, EconomyRules::default());
        if let Ok(country) = world.country_mut(id(0)) {
            country.reserve = 50;
        }
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = purchase_connection(&mut world, id(0), Target::Country(id(1)), &mut rng);
        assert_eq!(
            outcome.ok(),
            Some(ActionOutcome::Rejected {
                reason: RejectionReason::ConnectionCapReached
            })
        );
    }

    #[test]
    fn self_target_is_rejected() {
        let mut world = ready_world(2);
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = purchase_connection(&mut world, id(0), Target::Country(id(0)), &mut rng);
        assert_eq!(
            outcome.ok(),
            Some(ActionOutcome::Rejected {
                reason: RejectionReason::SelfTarget
            })
        );
    }

    #[test]
    fn random_target_never_picks_self() {
        let mut world = ready_world(4);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..5 {
            let _ = purchase_connection(&mut world, id(0), Target::Random, &mut rng);
        }
        assert!(get(&world, 0).connection_to(id(0)).is_none());
        assert!(!get(&world, 0).connections.is_empty());
    }

    #[test]
    fn blockade_round_trip_restores_markets() {
        let mut world = ready_world(2);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..2 {
            let _ = purchase_connection(&mut world, id(0), Target::Country(id(1)), &mut rng);
        }
        if let Ok(exporter) = world.country_mut(id(0)) {
            exporter.markets = 5;
        }

        let blockade = purchase_blockade(&mut world, id(1), Target::Heuristic, &mut rng);
        assert_eq!(blockade.ok(), Some(ActionOutcome::Applied { cost: 3 }));
        assert_eq!(get(&world, 0).markets, 3);
        assert!(get(&world, 0).connection_to(id(1)).is_some_and(|e| e.blockaded));

        let again = purchase_blockade(&mut world, id(1), Target::Random, &mut rng);
        assert_eq!(
            again.ok(),
            Some(ActionOutcome::Rejected {
                reason: RejectionReason::NoEligibleTarget
            })
        );

        let release = remove_blockade(&mut world, id(1), Target::Country(id(0)), &mut rng);
        assert_eq!(release.ok(), Some(ActionOutcome::Applied { cost: 0 }));
        assert_eq!(get(&world, 0).markets, 5);
    }

    #[test]
    fn blockade_floors_markets_at_zero() {
        let mut world = ready_world(2);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..3 {
            let _ = purchase_connection(&mut world, id(0), Target::Country(id(1)), &mut rng);
        }
        if let Ok(exporter) = world.country_mut(id(0)) {
            exporter.markets = 1;
        }
        let _ = purchase_blockade(&mut world, id(1), Target::Country(id(0)), &mut rng);
        assert_eq!(get(&world, 0).markets, 0);
    }

    #[test]
    fn blockade_requires_reserve() {
        let mut world = ready_world(2);
        let mut rng = StdRng::seed_from_u64(1);
        let _ = purchase_connection(&mut world, id(0), Target::Country(id(1)), &mut rng);
        if let Ok(importer) = world.country_mut(id(1)) {
            importer.reserve = 2;
        }
        let outcome = purchase_blockade(&mut world, id(1), Target::Random, &mut rng);
        assert_eq!(
            outcome.ok(),
            Some(ActionOutcome::Rejected {
                reason: RejectionReason::InsufficientReserve
            })
        );
    }

    #[test]
    fn ineligible_blockade_target_outranks_low_reserve() {
        let mut world = ready_world(3);
        let mut rng = StdRng::seed_from_u64(1);
        let _ = purchase_connection(&mut world, id(0), Target::Country(id(1)), &mut rng);
        if let Ok(importer) = world.country_mut(id(1)) {
            importer.reserve = 0;
        }
        // Country 2 exports nothing to 1.
        let outcome = purchase_blockade(&mut world, id(1), Target::Country(id(2)), &mut rng);
        assert_eq!(
            outcome.ok(),
            Some(ActionOutcome::Rejected {
                reason: RejectionReason::NoEligibleTarget
            })
        );
        let outcome = purchase_blockade(&mut world, id(1), Target::Country(id(0)), &mut rng);
        assert_eq!(
            outcome.ok(),
            Some(ActionOutcome::Rejected {
                reason: RejectionReason::InsufficientReserve
            })
        );
        assert!(get(&world, 0).connection_to(id(1)).is_some_and(|e| !e.blockaded));
    }

    #[test]
    fn remove_connection_explicit_and_empty() {
        let mut world = ready_world(3);
        let mut rng = StdRng::seed_from_u64(1);
        let _ = purchase_connection(&mut world, id(0), Target::Country(id(1)), &mut rng);
        let _ = purchase_connection(&mut world, id(0), Target::Country(id(2)), &mut rng);

        let removed = remove_connection(&mut world, id(0), Target::Country(id(2)), &mut rng);
        assert_eq!(removed.ok(), Some(ActionOutcome::Applied { cost: 0 }));
        assert!(get(&world, 0).connection_to(id(2)).is_none());

        let _ = remove_connection(&mut world, id(0), Target::Heuristic, &mut rng);
        let empty = remove_connection(&mut world, id(0), Target::Random, &mut rng);
        assert_eq!(
            empty.ok(),
            Some(ActionOutcome::Rejected {
                reason: RejectionReason::NoEligibleTarget
            })
        );
    }

    #[test]
    fn heuristic_removal_prefers_non_reciprocal_on_ties() {
        let mut world = ready_world(3);
        if let Ok(exporter) = world.country_mut(id(0)) {
            exporter.connections = vec![Connection::new(id(1)), Connection::new(id(2))];
        }
        if let Ok(partner) = world.country_mut(id(1)) {
            partner.connections = vec![Connection::new(id(0))];
        }
        let mut rng = StdRng::seed_from_u64(4);
        let _ = remove_connection(&mut world, id(0), Target::Heuristic, &mut rng);
        let remaining: Vec<usize> = get(&world, 0)
            .connections
            .iter()
            .map(|e| e.importer.index())
            .collect();
        assert_eq!(remaining, vec![1]);
    }

    #[test]
    fn heuristic_purchase_picks_largest_importer() {
        let mut world = ready_world(3);
        if let Ok(big) = world.country_mut(id(2)) {
            big.towns = 20;
        }
        let mut rng = StdRng::seed_from_u64(2);
        let outcome = purchase_connection(&mut world, id(0), Target::Heuristic, &mut rng);
        assert!(matches!(outcome, Ok(ActionOutcome::Applied { .. })));
        assert!(get(&world, 0).connection_to(id(2)).is_some());
    }
}
