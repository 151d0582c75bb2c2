//! The policy seam and the rule-based policy.
//!
//! A [`Policy`] picks one [`Action`] at a time for the country whose turn it
//! is. The turn loop in [`crate::turn`] applies each pick to the world and
//! reports the before/after snapshots back through [`Policy::observe`], which
//! is where learning policies update their tables.
//!
//! Policies receive the random source as `&mut dyn RngCore` so that they can
//! be boxed and swapped at run time.

use std::collections::VecDeque;

use rand::RngCore;
use tradesim_economy::potential_income;
use tradesim_types::{Action, ActionKind, ActionOutcome, CountryId, Target};
use tradesim_world::{Country, World, WorldError};

/// What a policy can see when asked to decide.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    /// The world as it stands before the decision.
    pub world: &'a World,
    /// The deciding country.
    pub actor: CountryId,
    /// Zero-based turn number within the current game.
    pub turn: u32,
    /// Length of the current game in turns.
    pub turns_per_game: u32,
}

impl DecisionContext<'_> {
    /// The deciding country.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CountryNotFound`] when the actor is unknown.
    pub fn country(&self) -> Result<&Country, WorldError> {
        self.world.country(self.actor)
    }
}

/// The parts of a country's state that the learner measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountrySnapshot {
    /// Power level at snapshot time.
    pub power_level: u8,
    /// Reserve at snapshot time.
    pub reserve: i64,
    /// Outgoing connection count.
    pub connections: usize,
    /// Mines owned.
    pub mines: u32,
    /// Income the country would earn if the turn ended now.
    pub potential_income: i64,
}

impl CountrySnapshot {
    /// Capture `id` from `world` without mutating it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CountryNotFound`] when `id` is unknown.
    pub fn capture(world: &World, id: CountryId) -> Result<Self, WorldError> {
        let country = world.country(id)?;
        Ok(Self {
            power_level: country.power_level,
            reserve: country.reserve,
            connections: country.connections.len(),
            mines: country.mines,
            potential_income: potential_income(world, id)?,
        })
    }
}

/// One applied decision as seen by a learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// The deciding country.
    pub actor: CountryId,
    /// Turn in which the decision was made.
    pub turn: u32,
    /// Length of the game in turns.
    pub turns_per_game: u32,
    /// What the policy chose.
    pub action: Action,
    /// What applying it did.
    pub outcome: ActionOutcome,
    /// State before the action.
    pub before: CountrySnapshot,
    /// State after the action.
    pub after: CountrySnapshot,
}

/// A decision maker for countries.
pub trait Policy {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Called once before the first decision of a country's turn.
    fn begin_turn(&mut self, _ctx: &DecisionContext<'_>) {}

    /// Choose the next action for `ctx.actor`.
    fn select(&mut self, ctx: &DecisionContext<'_>, rng: &mut dyn RngCore) -> Action;

    /// Receive the result of the last selected action.
    fn observe(&mut self, _transition: &Transition) {}

    /// Called after every completed game.
    fn end_game(&mut self) {}
}

/// Fixed priority play.
///
/// Each turn: attempt a connection; then buy a mine if the country has none,
/// else buy a town while `towns < 2 * index`, else attempt another
/// connection and another mine; then pass. Connection targets are random.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedPolicy {
    plan: VecDeque<Action>,
}

impl RuleBasedPolicy {
    /// A rule-based policy with an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    fn plan_for(country: &Country) -> VecDeque<Action> {
        let connect = Action::new(ActionKind::PurchaseConnection, Target::Random);
        let mine = Action::simple(ActionKind::PurchaseMine);
        let town = Action::simple(ActionKind::PurchaseTown);

        let town_goal = country.id.index().saturating_mul(2);
        let towns = usize::try_from(country.towns).unwrap_or(usize::MAX);

        let mut plan = VecDeque::from([connect]);
        if country.mines == 0 {
            plan.push_back(mine);
        } else if towns < town_goal {
            plan.push_back(town);
        } else {
            plan.push_back(connect);
            plan.push_back(mine);
        }
        plan.push_back(Action::pass());
        plan
    }
}

impl Policy for RuleBasedPolicy {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    fn begin_turn(&mut self, ctx: &DecisionContext<'_>) {
        self.plan = ctx.country().map(Self::plan_for).unwrap_or_default();
    }

    fn select(&mut self, _ctx: &DecisionContext<'_>, _rng: &mut dyn RngCore) -> Action {
        self.plan.pop_front().unwrap_or_else(Action::pass)
    }
}
