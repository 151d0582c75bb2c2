//! Action primitives and dispatch.
//!
//! [`apply`] is the only way a policy's decision reaches the world. After an
//! applied action every power level is recomputed and every connection cap
//! re-enforced, so later decisions in the same turn see current state.

mod handlers;
mod targeting;

use rand::Rng;
use tracing::debug;
use tradesim_types::{Action, ActionKind, ActionOutcome, CountryId};
use tradesim_world::{World, WorldError};

use crate::power::refresh_all;

pub use handlers::{
    purchase_blockade, purchase_connection, purchase_mine, purchase_town, remove_blockade,
    remove_connection,
};

/// Apply `action` on behalf of `actor`.
///
/// Rejections are ordinary outcomes and leave the world unchanged.
///
/// # Errors
///
/// Returns [`WorldError`] only for ids that do not exist in `world`.
pub fn apply<R>(
    world: &mut World,
    actor: CountryId,
    action: Action,
    rng: &mut R,
) -> Result<ActionOutcome, WorldError>
where
    R: Rng + ?Sized,
{
    let outcome = match action.kind {
        ActionKind::PurchaseMine => purchase_mine(world, actor)?,
        ActionKind::PurchaseTown => purchase_town(world, actor)?,
        ActionKind::PurchaseConnection => purchase_connection(world, actor, action.target, rng)?,
        ActionKind::RemoveConnection => remove_connection(world, actor, action.target, rng)?,
        ActionKind::PurchaseBlockade => purchase_blockade(world, actor, action.target, rng)?,
        ActionKind::RemoveBlockade => remove_blockade(world, actor, action.target, rng)?,
        ActionKind::DoNothing => ActionOutcome::Passed,
    };

    match outcome {
        ActionOutcome::Applied { cost } => {
            refresh_all(world)?;
            debug!(country = %actor, action = %action.kind, cost, "Action applied");
        }
        ActionOutcome::Rejected { reason } => {
            debug!(country = %actor, action = %action.kind, %reason, "Action rejected");
        }
        ActionOutcome::Passed => {}
    }

    Ok(outcome)
}
