//! Candidate lists and heuristic scores for targeted actions.
//!
//! Each targeted action has an eligibility list (who it may act on) and a
//! heuristic score biased by the actor's perception. Resolution of a
//! [`Target`] into a concrete counterpart happens in [`resolve`].

use rand::Rng;
use tradesim_types::{Connection, CountryId, RejectionReason, Target};
use tradesim_world::{Country, World, WorldError};

use crate::selection::{Goal, select_scored};

/// Weight of the estimated income gain against the perception bias when
/// scoring a connection purchase.
const CONNECTION_GAIN_WEIGHT: i64 = 10;

/// Resolve `target` against `eligible`.
///
/// An explicit country must appear in `eligible`; heuristic and random
/// targets pick from it. `random_pool` is where [`Target::Random`] draws from
/// (the eligible list for most actions, every other country for purchases).
pub(crate) fn resolve<R>(
    actor: CountryId,
    target: Target,
    eligible: &[CountryId],
    random_pool: &[CountryId],
    heuristic: impl FnOnce(&[CountryId], &mut R) -> Option<CountryId>,
    rng: &mut R,
) -> Result<CountryId, RejectionReason>
where
    R: Rng + ?Sized,
{
    match target {
        Target::Country(id) if id == actor => Err(RejectionReason::SelfTarget),
        Target::Country(id) => {
            if eligible.contains(&id) {
                Ok(id)
            } else {
                Err(RejectionReason::NoEligibleTarget)
            }
        }
        Target::Random => match random_pool.len() {
            0 => Err(RejectionReason::NoEligibleTarget),
            len => random_pool
                .get(rng.random_range(0..len))
                .copied()
                .ok_or(RejectionReason::NoEligibleTarget),
        },
        Target::Heuristic => heuristic(eligible, rng).ok_or(RejectionReason::NoEligibleTarget),
    }
}

// ---------------------------------------------------------------------------
// Connection purchase
// ---------------------------------------------------------------------------

/// Importers the actor could connect to right now: existing edges below the
/// maximum level, or new partners while under the connection cap.
pub(crate) fn purchasable_importers(world: &World, actor: &Country) -> Vec<CountryId> {
    let cap = world.rules().connection_cap(actor.power_level);
    let room = actor.connections.len() < cap;
    world
        .others(actor.id)
        .into_iter()
        .filter(|&other| {
            actor
                .connection_to(other)
                .map_or(room, Connection::can_upgrade)
        })
        .collect()
}

/// Estimated value to `actor` of buying (or upgrading) an edge to `importer`.
pub(crate) fn connection_purchase_score(
    world: &World,
    actor: &Country,
    importer: CountryId,
) -> Result<i64, WorldError> {
    let partner = world.country(importer)?;
    let size = i64::from(partner.size());
    let rules = world.rules();

    let gain = match actor.connection_to(importer) {
        Some(edge) => {
            let next = edge.level.saturating_add(1);
            size.div_euclid(rules.trade_divisor(next))
                .saturating_sub(size.div_euclid(rules.trade_divisor(edge.level)))
        }
        None => i64::from(actor.mines)
            .div_euclid(2)
            .saturating_add(size.div_euclid(rules.trade_divisor(1))),
    };

    Ok(gain
        .saturating_mul(CONNECTION_GAIN_WEIGHT)
        .saturating_add(actor.perception_of(importer)))
}

/// Heuristic importer pick: best estimated value, preferring partners that
/// already export to the actor.
pub(crate) fn pick_importer<R>(
    world: &World,
    actor: &Country,
    eligible: &[CountryId],
    rng: &mut R,
) -> Option<CountryId>
where
    R: Rng + ?Sized,
{
    select_scored(
        eligible,
        |&importer| connection_purchase_score(world, actor, importer).unwrap_or(i64::MIN),
        |&importer| world.has_connection(importer, actor.id),
        Goal::Highest,
        rng,
    )
}

// ---------------------------------------------------------------------------
// Connection removal
// ---------------------------------------------------------------------------

/// Value to the actor of keeping its edge to `importer`.
///
/// `importer.mines / 2 + own_size * level / 6 + retention * level
/// - perception[importer]`.
pub(crate) fn connection_retention_score(
    world: &World,
    actor: &Country,
    edge: &Connection,
) -> Result<i64, WorldError> {
    let partner = world.country(edge.importer)?;
    let rules = world.rules();
    let level = i64::from(edge.level);
    let own_yield = i64::from(actor.size())
        .saturating_mul(level)
        .div_euclid(rules.trade_divisor_base.max(1));

    Ok(i64::from(partner.mines)
        .div_euclid(2)
        .saturating_add(own_yield)
        .saturating_add(rules.retention_bonus_per_level.saturating_mul(level))
        .saturating_sub(actor.perception_of(edge.importer)))
}

/// Heuristic edge to drop: lowest retention value, preferring importers that
/// do not export back.
pub(crate) fn pick_edge_to_drop<R>(
    world: &World,
    actor: &Country,
    eligible: &[CountryId],
    rng: &mut R,
) -> Option<CountryId>
where
    R: Rng + ?Sized,
{
    select_scored(
        eligible,
        |&importer| {
            actor
                .connection_to(importer)
                .and_then(|edge| connection_retention_score(world, actor, edge).ok())
                .unwrap_or(i64::MAX)
        },
        |&importer| !world.is_reciprocal(actor.id, importer),
        Goal::Lowest,
        rng,
    )
}

// ---------------------------------------------------------------------------
// Blockades
// ---------------------------------------------------------------------------

/// Exporters whose edge into `actor` has the given blockade state.
pub(crate) fn inbound_exporters(world: &World, actor: CountryId, blockaded: bool) -> Vec<CountryId> {
    world
        .inbound(actor)
        .into_iter()
        .filter(|(_, edge)| edge.blockaded == blockaded)
        .map(|(exporter, _)| exporter)
        .collect()
}

/// Heuristic exporter to blockade: least trusted, preferring exporters the
/// actor does not export to.
pub(crate) fn pick_blockade<R>(
    actor: &Country,
    eligible: &[CountryId],
    rng: &mut R,
) -> Option<CountryId>
where
    R: Rng + ?Sized,
{
    select_scored(
        eligible,
        |&exporter| actor.perception_of(exporter),
        |&exporter| actor.connection_to(exporter).is_none(),
        Goal::Lowest,
        rng,
    )
}

/// Heuristic blockade to lift: most trusted exporter, preferring exporters
/// the actor also exports to.
pub(crate) fn pick_release<R>(
    actor: &Country,
    eligible: &[CountryId],
    rng: &mut R,
) -> Option<CountryId>
where
    R: Rng + ?Sized,
{
    select_scored(
        eligible,
        |&exporter| actor.perception_of(exporter),
        |&exporter| actor.connection_to(exporter).is_some(),
        Goal::Highest,
        rng,
    )
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tradesim_world::EconomyRules;

    use super::*;

    fn id(index: usize) -> CountryId {
        CountryId::new(index)
    }

    /// Three countries; country 0 sees 1 and 2 with the given scores.
    fn world_with_perception(toward_one: i64, toward_two: i64) -> World {
        let mut world = World::new(3, EconomyRules::default());
        if let Ok(actor) = world.country_mut(id(0)) {
            actor.perception = vec![0, toward_one, toward_two];
        }
        world
    }

    fn edge_into_actor(world: &mut World, exporter: usize, blockaded: bool) {
        if let Ok(country) = world.country_mut(id(exporter)) {
            country.connections.push(Connection {
                importer: id(0),
                level: 1,
                blockaded,
            });
        }
    }

    fn pick<F>(world: &World, choose: F) -> Option<CountryId>
    where
        F: FnOnce(&Country, &mut StdRng) -> Option<CountryId>,
    {
        let mut rng = StdRng::seed_from_u64(9);
        world.country(id(0)).ok().and_then(|actor| choose(actor, &mut rng))
    }

    #[test]
    fn blockade_goes_to_least_trusted_exporter() {
        for (one, two, expected) in [(5, -20, 2), (-30, 0, 1)] {
            let mut world = world_with_perception(one, two);
            edge_into_actor(&mut world, 1, false);
            edge_into_actor(&mut world, 2, false);
            let open = inbound_exporters(&world, id(0), false);
            assert_eq!(
                pick(&world, |actor, rng| pick_blockade(actor, &open, rng)),
                Some(id(expected))
            );
        }
    }

    #[test]
    fn release_goes_to_most_trusted_exporter() {
        for (one, two, expected) in [(40, 0, 1), (-5, 3, 2)] {
            let mut world = world_with_perception(one, two);
            edge_into_actor(&mut world, 1, true);
            edge_into_actor(&mut world, 2, true);
            let blocked = inbound_exporters(&world, id(0), true);
            assert_eq!(
                pick(&world, |actor, rng| pick_release(actor, &blocked, rng)),
                Some(id(expected))
            );
        }
    }

    #[test]
    fn trusted_importer_is_kept_when_dropping() {
        for (one, two, expected_drop) in [(0, 50, 2), (50, 0, 1)] {
            let mut world = world_with_perception(one, two);
            if let Ok(actor) = world.country_mut(id(0)) {
                actor.connections = vec![Connection::new(id(1)), Connection::new(id(2))];
            }
            let eligible = [id(1), id(2)];
            assert_eq!(
                pick(&world, |actor, rng| pick_edge_to_drop(&world, actor, &eligible, rng)),
                Some(id(expected_drop))
            );
        }
    }

    #[test]
    fn retention_score_subtracts_perception() {
        let world = world_with_perception(0, 12);
        let Ok(actor) = world.country(id(0)) else {
            return;
        };
        let edge = Connection::new(id(2));
        // mines 0, own size 0, retention 3 * level 1, minus 12.
        assert_eq!(connection_retention_score(&world, actor, &edge).ok(), Some(-9));
    }

    #[test]
    fn perception_breaks_equal_purchase_gains() {
        for (one, two, expected) in [(0, 7, 2), (7, 0, 1)] {
            let mut world = world_with_perception(one, two);
            if let Ok(actor) = world.country_mut(id(0)) {
                actor.towns = 5;
                actor.power_level = 2;
            }
            let Ok(actor) = world.country(id(0)) else {
                return;
            };
            let eligible = purchasable_importers(&world, actor);
            assert_eq!(eligible, vec![id(1), id(2)]);
            assert_eq!(
                pick(&world, |actor, rng| pick_importer(&world, actor, &eligible, rng)),
                Some(id(expected))
            );
        }
    }
}
