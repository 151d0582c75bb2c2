//! Policies, learning, and orchestration for the Tradesim simulation.
//!
//! This crate drives the economic engine in `tradesim-economy`: it decides
//! what every country does each turn and runs whole games.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `tradesim-config.yaml` into
//!   strongly-typed structs.
//! - [`perception`] -- Decaying trust/threat scores between countries.
//! - [`policy`] -- The [`Policy`] trait and [`RuleBasedPolicy`].
//! - [`qlearning`] -- State keys, the Q-table, and [`QLearningPolicy`].
//! - [`learner`] -- Reward and temporal-difference update.
//! - [`turn`] -- One turn across all countries.
//! - [`runner`] -- Multi-game driver and run summary.
//!
//! [`Policy`]: policy::Policy
//! [`RuleBasedPolicy`]: policy::RuleBasedPolicy
//! [`QLearningPolicy`]: qlearning::QLearningPolicy

pub mod config;
pub mod learner;
pub mod perception;
pub mod policy;
pub mod qlearning;
pub mod runner;
pub mod turn;

pub use config::{ConfigError, PolicyKind, SimulationConfig};
pub use policy::{CountrySnapshot, DecisionContext, Policy, RuleBasedPolicy, Transition};
pub use qlearning::{ActionValues, ParseStateKeyError, QLearningPolicy, QTable, StateKey};
pub use runner::{RunSummary, RunnerError, run_games};
pub use turn::{TurnError, TurnReport, TurnSettings, run_turn};
