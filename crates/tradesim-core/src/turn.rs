//! One turn of the game.
//!
//! Countries act strictly in index order. For each country the turn is:
//!
//! 1. recompute its power level and enforce its connection cap,
//! 2. collect income (charging upkeep to its importers),
//! 3. update its perception scores,
//! 4. let the policy pick and apply actions until it passes, the country can
//!    no longer afford anything, or the per-turn action limit is reached.
//!    A rejected action is observed and the loop carries on.
//!
//! Each country's loop runs to completion before the next country starts.

use rand::RngCore;
use tracing::{debug, trace};
use tradesim_economy::{apply, collect_income, enforce_connection_cap, find_power_level};
use tradesim_types::{ActionKind, ActionOutcome, CountryId};
use tradesim_world::{World, WorldError};

use crate::config::PerceptionConfig;
use crate::perception::update_perception;
use crate::policy::{CountrySnapshot, DecisionContext, Policy, Transition};

/// Errors that can abort a turn.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// The world was asked about a country that does not exist.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Fixed parameters of every turn in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnSettings {
    /// Length of the game in turns.
    pub turns_per_game: u32,
    /// Upper bound on actions per country per turn.
    pub max_actions_per_turn: u32,
}

/// Why a country's decision loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEnd {
    /// The policy chose to pass.
    Passed,
    /// The reserve no longer covers the cheapest purchase.
    Unaffordable,
    /// The per-turn action limit was reached.
    ActionLimit,
}

/// What happened to one country during its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryTurn {
    /// The country.
    pub country: CountryId,
    /// Income collected at the start of the turn.
    pub income: i64,
    /// Actions that changed the world.
    pub applied: u32,
    /// Actions that were rejected.
    pub rejected: u32,
    /// Why the loop ended.
    pub end: TurnEnd,
}

/// Outcome of a full turn across all countries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// Per-country results in index order.
    pub countries: Vec<CountryTurn>,
}

impl TurnReport {
    /// Largest income collected by any country this turn.
    pub fn highest_income(&self) -> Option<i64> {
        self.countries.iter().map(|c| c.income).max()
    }
}

/// Whether `id` can pay for at least one purchase.
///
/// # Errors
///
/// Returns [`WorldError::CountryNotFound`] when `id` is unknown.
pub fn can_afford_any(world: &World, id: CountryId) -> Result<bool, WorldError> {
    let country = world.country(id)?;
    let cheapest = world
        .rules()
        .cheapest_purchase(country.power_level, country.mines);
    Ok(country.reserve >= cheapest)
}

/// Play turn `turn` for every country.
///
/// # Errors
///
/// Returns [`TurnError`] if the world is inconsistent.
pub fn run_turn(
    world: &mut World,
    policy: &mut dyn Policy,
    turn: u32,
    settings: TurnSettings,
    perception: &PerceptionConfig,
    rng: &mut dyn RngCore,
) -> Result<TurnReport, TurnError> {
    let mut report = TurnReport::default();
    for id in world.ids() {
        find_power_level(world, id)?;
        enforce_connection_cap(world, id)?;
        let income = collect_income(world, id)?;
        update_perception(world, id, perception)?;
        let result = play_country(world, id, policy, turn, settings, income, rng)?;
        report.countries.push(result);
    }
    debug!(
        turn,
        highest_income = report.highest_income(),
        "Turn complete"
    );
    Ok(report)
}

/// Run one country's decision loop.
fn play_country(
    world: &mut World,
    id: CountryId,
    policy: &mut dyn Policy,
    turn: u32,
    settings: TurnSettings,
    income: i64,
    rng: &mut dyn RngCore,
) -> Result<CountryTurn, TurnError> {
    let mut result = CountryTurn {
        country: id,
        income,
        applied: 0,
        rejected: 0,
        end: TurnEnd::Passed,
    };

    policy.begin_turn(&DecisionContext {
        world,
        actor: id,
        turn,
        turns_per_game: settings.turns_per_game,
    });

    let mut taken = 0_u32;
    result.end = loop {
        if taken >= settings.max_actions_per_turn {
            break TurnEnd::ActionLimit;
        }
        if !can_afford_any(world, id)? {
            break TurnEnd::Unaffordable;
        }

        let before = CountrySnapshot::capture(world, id)?;
        let action = policy.select(
            &DecisionContext {
                world,
                actor: id,
                turn,
                turns_per_game: settings.turns_per_game,
            },
            rng,
        );
        let outcome = apply(world, id, action, rng)?;
        let after = CountrySnapshot::capture(world, id)?;
        taken = taken.saturating_add(1);

        policy.observe(&Transition {
            actor: id,
            turn,
            turns_per_game: settings.turns_per_game,
            action,
            outcome,
            before,
            after,
        });

        match outcome {
            ActionOutcome::Applied { .. } => {
                result.applied = result.applied.saturating_add(1);
            }
            ActionOutcome::Rejected { .. } => {
                result.rejected = result.rejected.saturating_add(1);
            }
            ActionOutcome::Passed => break TurnEnd::Passed,
        }
        if action.kind == ActionKind::DoNothing {
            break TurnEnd::Passed;
        }
    };

    trace!(
        country = %id,
        turn,
        applied = result.applied,
        rejected = result.rejected,
        end = ?result.end,
        "Country turn finished"
    );
    Ok(result)
}
