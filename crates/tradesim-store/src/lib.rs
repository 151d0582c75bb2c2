//! Q-table persistence for the Tradesim simulation.
//!
//! The learned table outlives a single run. It is stored as one flat JSON
//! object mapping the textual state key `"power,money,connections,turn"` to
//! an array of action values in [`ActionKind`] slot order:
//!
//! ```text
//! {
//!   "1,0,0,0": [3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.5],
//!   "2,4,1,1": [0.0, 12.25, 7.0, 0.0, 0.0, 0.0, 0.0]
//! }
//! ```
//!
//! # Modules
//!
//! - [`qtable_store`] -- Load and save of the JSON file
//! - [`error`] -- Shared error types
//!
//! [`ActionKind`]: tradesim_types::ActionKind

pub mod error;
pub mod qtable_store;

pub use error::StoreError;
pub use qtable_store::QTableStore;
