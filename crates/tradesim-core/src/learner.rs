//! Temporal-difference learner.
//!
//! Reward for one decision is
//! `income_weight * d_income + connection_weight * d_connections + mine_weight * mines`
//! measured on potential income, so nothing is committed to the world when
//! the learner looks. The update is the one-step Q-learning rule
//! `Q[s][a] += alpha * (r + gamma * max Q[s'] - Q[s][a])`.

use tradesim_types::ActionKind;

use crate::config::LearningConfig;
use crate::policy::CountrySnapshot;
use crate::qlearning::{QTable, StateKey};

/// Learning rate schedule, discount, and reward weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Learner {
    alpha: f64,
    gamma: f64,
    decay: f64,
    alpha_floor: f64,
    income_weight: f64,
    connection_weight: f64,
    mine_weight: f64,
}

impl Learner {
    /// A learner at the configured initial rates.
    pub const fn new(config: &LearningConfig) -> Self {
        Self {
            alpha: config.alpha,
            gamma: config.gamma,
            decay: config.decay,
            alpha_floor: config.alpha_floor,
            income_weight: config.income_weight,
            connection_weight: config.connection_weight,
            mine_weight: config.mine_weight,
        }
    }

    /// Current learning rate.
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Reward for moving from `before` to `after`.
    pub fn reward(&self, before: &CountrySnapshot, after: &CountrySnapshot) -> f64 {
        let income_delta = after
            .potential_income
            .saturating_sub(before.potential_income);
        let after_connections = i64::try_from(after.connections).unwrap_or(i64::MAX);
        let before_connections = i64::try_from(before.connections).unwrap_or(i64::MAX);
        let connection_delta = after_connections.saturating_sub(before_connections);

        self.income_weight * to_f64(income_delta)
            + self.connection_weight * to_f64(connection_delta)
            + self.mine_weight * f64::from(after.mines)
    }

    /// Apply one update to `table`. Returns the new value of `Q[old][action]`.
    pub fn update(
        &self,
        table: &mut QTable,
        old: StateKey,
        action: ActionKind,
        reward: f64,
        new: StateKey,
    ) -> f64 {
        let next_best = table.max_value(new);
        let values = table.values_mut(old);
        let Some(slot) = values.get_mut(action.index()) else {
            return 0.0;
        };
        *slot += self.alpha * (reward + self.gamma * next_best - *slot);
        *slot
    }

    /// Decay alpha geometrically, respecting the floor.
    pub fn decay(&mut self) {
        self.alpha = (self.alpha * self.decay).max(self.alpha_floor);
    }
}

// Income and connection deltas stay far below 2^53.
#[allow(clippy::cast_precision_loss)]
const fn to_f64(value: i64) -> f64 {
    value as f64
}
