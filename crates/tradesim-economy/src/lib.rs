//! Economic engine for the Tradesim simulation.
//!
//! Everything here operates on an explicit [`World`] without touching I/O.
//! It sits between `tradesim-world` (the data) and `tradesim-core` (policies
//! and the turn loop).
//!
//! # Modules
//!
//! - [`power`] -- Power level derivation and connection-cap enforcement
//! - [`income`] -- Per-turn income and importer upkeep
//! - [`selection`] -- Scored candidate selection shared by heuristic targeting
//! - [`actions`] -- Action primitives and the single [`apply`] dispatcher
//!
//! [`World`]: tradesim_world::World
//! [`apply`]: actions::apply

pub mod actions;
pub mod income;
pub mod power;
pub mod selection;

pub use actions::apply;
pub use income::{collect_income, generate_money, potential_income};
pub use power::{enforce_connection_cap, find_power_level, refresh_all};
pub use selection::{Goal, select_scored};
