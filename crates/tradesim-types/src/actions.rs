//! Action requests and the outcome of applying them.

use serde::{Deserialize, Serialize};

use crate::enums::{ActionKind, RejectionReason, Target};

/// One action chosen by a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// What to do.
    pub kind: ActionKind,
    /// How to resolve the counterpart for targeted kinds. Ignored otherwise.
    pub target: Target,
}

impl Action {
    /// An action with the given kind and target.
    pub const fn new(kind: ActionKind, target: Target) -> Self {
        Self { kind, target }
    }

    /// An untargeted action (the target defaults to [`Target::Random`]).
    pub const fn simple(kind: ActionKind) -> Self {
        Self {
            kind,
            target: Target::Random,
        }
    }

    /// The explicit pass action.
    pub const fn pass() -> Self {
        Self::simple(ActionKind::DoNothing)
    }
}

/// Result of applying an [`Action`] to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The action changed the world and charged `cost` to the actor.
    Applied {
        /// Amount debited from the actor's reserve.
        cost: i64,
    },
    /// The action was a no-op.
    Rejected {
        /// Why it was not applied.
        reason: RejectionReason,
    },
    /// The actor chose to end the turn.
    Passed,
}
