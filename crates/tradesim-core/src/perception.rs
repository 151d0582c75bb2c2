//! Per-country trust/threat scores.
//!
//! Each country keeps one integer score toward every other country. Scores
//! are decayed every turn and then nudged by the current state of the
//! connections between the pair:
//!
//! | Edge                                   | Open          | Blockaded           |
//! |----------------------------------------|---------------|---------------------|
//! | inbound (other exports to observer)    | `+10 * level` | `-(15 + 5 * level)` |
//! | outgoing (observer exports to other)   | `+4 * level + 10` | `+5 * level`    |
//!
//! A score that ends lower than it started takes an extra momentum penalty.
//! Perception only biases heuristic targeting; it never enters the learned
//! state and is never persisted.

use tracing::trace;
use tradesim_types::CountryId;
use tradesim_world::{World, WorldError};

use crate::config::PerceptionConfig;

/// Recompute `observer`'s perception of every other country.
///
/// # Errors
///
/// Returns [`WorldError::CountryNotFound`] when `observer` is unknown.
pub fn update_perception(
    world: &mut World,
    observer: CountryId,
    config: &PerceptionConfig,
) -> Result<(), WorldError> {
    let previous = world.country(observer)?.perception.clone();
    let mut scores: Vec<i64> = previous
        .iter()
        .map(|&score| {
            score
                .saturating_mul(config.decay_numerator)
                .checked_div(config.decay_denominator)
                .unwrap_or(0)
        })
        .collect();

    for (exporter, edge) in world.inbound(observer) {
        let level = i64::from(edge.level);
        let delta = if edge.blockaded {
            config
                .inbound_blockaded_base
                .saturating_add(config.inbound_blockaded_per_level.saturating_mul(level))
                .saturating_neg()
        } else {
            config.inbound_per_level.saturating_mul(level)
        };
        bump(&mut scores, exporter, delta);
    }

    for edge in &world.country(observer)?.connections {
        let level = i64::from(edge.level);
        let delta = if edge.blockaded {
            config.outbound_blockaded_per_level.saturating_mul(level)
        } else {
            config
                .outbound_per_level
                .saturating_mul(level)
                .saturating_add(config.outbound_base)
        };
        bump(&mut scores, edge.importer, delta);
    }

    for (score, before) in scores.iter_mut().zip(&previous) {
        if *score < *before {
            *score = score.saturating_sub(config.momentum_penalty);
        }
    }
    if let Some(own) = scores.get_mut(observer.index()) {
        *own = 0;
    }

    trace!(country = %observer, ?scores, "Perception updated");
    world.country_mut(observer)?.perception = scores;
    Ok(())
}

fn bump(scores: &mut [i64], other: CountryId, delta: i64) {
    if let Some(score) = scores.get_mut(other.index()) {
        *score = score.saturating_add(delta);
    }
}
