//! Shared type definitions for the Tradesim economy simulation.
//!
//! This crate is the single source of truth for the small vocabulary every
//! other crate speaks: country identifiers, trade connections, the closed set
//! of action kinds, and the outcome of applying an action.
//!
//! # Modules
//!
//! - [`ids`] -- Index-based country identifiers
//! - [`enums`] -- Action kinds, action targets, rejection reasons
//! - [`structs`] -- The directed trade [`Connection`] edge
//! - [`actions`] -- Action requests and their outcomes
//!
//! [`Connection`]: structs::Connection

pub mod actions;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{Action, ActionOutcome};
pub use enums::{ACTION_COUNT, ActionKind, RejectionReason, Target};
pub use ids::CountryId;
pub use structs::{Connection, MAX_CONNECTION_LEVEL};
