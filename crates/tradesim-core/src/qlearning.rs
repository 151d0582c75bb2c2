//! Tabular Q-learning: state keys, the value table, and the epsilon-greedy
//! policy.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rand::{Rng, RngCore};
use tracing::{debug, trace};
use tradesim_types::{ACTION_COUNT, Action, ActionKind, Target};

use crate::config::{LearningConfig, TargetingMode};
use crate::learner::Learner;
use crate::policy::{CountrySnapshot, DecisionContext, Policy, Transition};

/// Action values for one state, indexed by [`ActionKind::index`].
pub type ActionValues = [f64; ACTION_COUNT];

// ---------------------------------------------------------------------------
// State key
// ---------------------------------------------------------------------------

/// Discretized country state used to index the Q-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey {
    /// Power level.
    pub power_level: u8,
    /// Reserve bucket, see [`money_level`].
    pub money_level: u8,
    /// Outgoing connection count.
    pub connections: u32,
    /// Turn-progress bucket, see [`turn_bucket`].
    pub turn_bucket: u32,
}

impl StateKey {
    /// Discretize a snapshot taken during `turn` of a `turns_per_game` game.
    pub fn from_snapshot(
        snapshot: &CountrySnapshot,
        turn: u32,
        turns_per_game: u32,
        config: &LearningConfig,
    ) -> Self {
        Self {
            power_level: snapshot.power_level,
            money_level: money_level(snapshot.reserve, config.money_levels),
            connections: u32::try_from(snapshot.connections).unwrap_or(u32::MAX),
            turn_bucket: turn_bucket(turn, turns_per_game, config.turn_buckets),
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.power_level, self.money_level, self.connections, self.turn_bucket
        )
    }
}

/// A state key string that is not four comma-separated integers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed state key {key:?}")]
pub struct ParseStateKeyError {
    /// The offending text.
    pub key: String,
}

impl FromStr for StateKey {
    type Err = ParseStateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseStateKeyError { key: s.to_owned() };
        let mut parts = s.split(',').map(str::trim);
        let mut next = || parts.next().ok_or_else(malformed);

        let power_level: u8 = next()?.parse().ok().ok_or_else(malformed)?;
        let money_level: u8 = next()?.parse().ok().ok_or_else(malformed)?;
        let connections: u32 = next()?.parse().ok().ok_or_else(malformed)?;
        let turn_bucket: u32 = next()?.parse().ok().ok_or_else(malformed)?;
        if next().is_ok() {
            return Err(malformed());
        }

        Ok(Self {
            power_level,
            money_level,
            connections,
            turn_bucket,
        })
    }
}

/// Bit length of a positive reserve, capped at `cap`. Zero for `reserve <= 0`.
pub fn money_level(reserve: i64, cap: u8) -> u8 {
    let Ok(positive) = u64::try_from(reserve) else {
        return 0;
    };
    let bits = u64::BITS.saturating_sub(positive.leading_zeros());
    u8::try_from(bits).unwrap_or(u8::MAX).min(cap)
}

/// `turn * buckets / turns_per_game`, clamped to the last bucket.
pub fn turn_bucket(turn: u32, turns_per_game: u32, buckets: u32) -> u32 {
    let scaled = u64::from(turn).saturating_mul(u64::from(buckets));
    let bucket = scaled.checked_div(u64::from(turns_per_game)).unwrap_or(0);
    u32::try_from(bucket)
        .unwrap_or(u32::MAX)
        .min(buckets.saturating_sub(1))
}

// ---------------------------------------------------------------------------
// Q-table
// ---------------------------------------------------------------------------

/// Map from [`StateKey`] to per-action values.
///
/// States are created lazily at zero on first visit and never removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    entries: HashMap<StateKey, ActionValues>,
}

impl QTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of known states.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no state has been visited.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Values for `state`, if it has been visited.
    pub fn get(&self, state: &StateKey) -> Option<&ActionValues> {
        self.entries.get(state)
    }

    /// Values for `state`, inserting zeros on first visit.
    pub fn values_mut(&mut self, state: StateKey) -> &mut ActionValues {
        self.entries.entry(state).or_insert([0.0; ACTION_COUNT])
    }

    /// Replace the values for `state`.
    pub fn insert(&mut self, state: StateKey, values: ActionValues) {
        self.entries.insert(state, values);
    }

    /// Best value in `state`, inserting zeros on first visit.
    pub fn max_value(&mut self, state: StateKey) -> f64 {
        self.values_mut(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Highest-valued action in `state`; the first index wins ties.
    pub fn best_action(&mut self, state: StateKey) -> ActionKind {
        let values = self.values_mut(state);
        let mut best = 0_usize;
        let mut best_value = f64::NEG_INFINITY;
        for (index, &value) in values.iter().enumerate() {
            if value > best_value {
                best = index;
                best_value = value;
            }
        }
        ActionKind::from_index(best).unwrap_or(ActionKind::DoNothing)
    }

    /// Iterate over every visited state.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.entries.iter()
    }
}

impl FromIterator<(StateKey, ActionValues)> for QTable {
    fn from_iter<I: IntoIterator<Item = (StateKey, ActionValues)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Epsilon-greedy policy over a [`QTable`], trained by a [`Learner`].
#[derive(Debug, Clone)]
pub struct QLearningPolicy {
    table: QTable,
    learner: Learner,
    config: LearningConfig,
    epsilon: f64,
}

impl QLearningPolicy {
    /// A policy that starts from `table` with the configured rates.
    pub fn new(table: QTable, config: LearningConfig) -> Self {
        Self {
            table,
            learner: Learner::new(&config),
            epsilon: config.epsilon,
            config,
        }
    }

    /// The current table.
    pub const fn table(&self) -> &QTable {
        &self.table
    }

    /// Consume the policy, returning its table for persistence.
    pub fn into_table(self) -> QTable {
        self.table
    }

    /// Current exploration rate.
    pub const fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Current learning rate.
    pub const fn alpha(&self) -> f64 {
        self.learner.alpha()
    }

    /// Discretize the deciding country's current state.
    fn state_for(&self, ctx: &DecisionContext<'_>) -> Option<StateKey> {
        let snapshot = CountrySnapshot::capture(ctx.world, ctx.actor).ok()?;
        Some(StateKey::from_snapshot(
            &snapshot,
            ctx.turn,
            ctx.turns_per_game,
            &self.config,
        ))
    }

    const fn target(&self) -> Target {
        match self.config.targeting {
            TargetingMode::Heuristic => Target::Heuristic,
            TargetingMode::Random => Target::Random,
        }
    }
}

impl Policy for QLearningPolicy {
    fn name(&self) -> &'static str {
        "q_learning"
    }

    fn select(&mut self, ctx: &DecisionContext<'_>, rng: &mut dyn RngCore) -> Action {
        let Some(state) = self.state_for(ctx) else {
            return Action::pass();
        };
        let kind = if rng.random::<f64>() < self.epsilon {
            ActionKind::from_index(rng.random_range(0..ACTION_COUNT))
                .unwrap_or(ActionKind::DoNothing)
        } else {
            self.table.best_action(state)
        };
        trace!(country = %ctx.actor, %state, action = %kind, "Q-learning selection");
        Action::new(kind, self.target())
    }

    fn observe(&mut self, transition: &Transition) {
        let old = StateKey::from_snapshot(
            &transition.before,
            transition.turn,
            transition.turns_per_game,
            &self.config,
        );
        let new = StateKey::from_snapshot(
            &transition.after,
            transition.turn,
            transition.turns_per_game,
            &self.config,
        );
        let reward = self.learner.reward(&transition.before, &transition.after);
        self.learner
            .update(&mut self.table, old, transition.action.kind, reward, new);
    }

    fn end_game(&mut self) {
        self.learner.decay();
        self.epsilon = (self.epsilon * self.config.decay).max(self.config.epsilon_floor);
        debug!(
            alpha = self.learner.alpha(),
            epsilon = self.epsilon,
            states = self.table.len(),
            "Learning rates decayed"
        );
    }
}
