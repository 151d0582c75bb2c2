//! Countries, the directed trade graph, and the economy rule book.
//!
//! The [`World`] is the single shared mutable state of one game. Every
//! operation elsewhere in the workspace receives it explicitly; there is no
//! module-level state. A world is rebuilt from scratch at the start of every
//! game, while learned policies outlive it.
//!
//! # Modules
//!
//! - [`country`] -- Per-country economic state ([`Country`])
//! - [`world`] -- The country list and graph queries ([`World`])
//! - [`rules`] -- Tunable costs, thresholds, and caps ([`EconomyRules`])
//! - [`error`] -- Error types ([`WorldError`])

pub mod country;
pub mod error;
pub mod rules;
pub mod world;

pub use country::Country;
pub use error::WorldError;
pub use rules::{BlockadeRule, EconomyRules};
pub use world::World;
