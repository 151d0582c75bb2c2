//! Enumeration types for the Tradesim simulation.

use serde::{Deserialize, Serialize};

use crate::ids::CountryId;

// ---------------------------------------------------------------------------
// Action kinds
// ---------------------------------------------------------------------------

/// Number of distinct [`ActionKind`] variants.
///
/// Learned value vectors are fixed-size arrays of this length, indexed by
/// [`ActionKind::index`].
pub const ACTION_COUNT: usize = 7;

/// The closed set of actions a country can take during its turn.
///
/// The declaration order is the slot order of every learned value vector and
/// must not change once tables have been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Buy one mine (3 for the first, 7 thereafter).
    PurchaseMine,
    /// Buy one town at a cost equal to the current power level.
    PurchaseTown,
    /// Open a new connection or upgrade an existing one.
    PurchaseConnection,
    /// Drop one outgoing connection.
    RemoveConnection,
    /// Blockade one inbound connection.
    PurchaseBlockade,
    /// Lift a blockade on one inbound connection.
    RemoveBlockade,
    /// End the turn.
    DoNothing,
}

impl ActionKind {
    /// Every action kind in slot order.
    pub const ALL: [Self; ACTION_COUNT] = [
        Self::PurchaseMine,
        Self::PurchaseTown,
        Self::PurchaseConnection,
        Self::RemoveConnection,
        Self::PurchaseBlockade,
        Self::RemoveBlockade,
        Self::DoNothing,
    ];

    /// Slot of this action in a value vector.
    pub const fn index(self) -> usize {
        match self {
            Self::PurchaseMine => 0,
            Self::PurchaseTown => 1,
            Self::PurchaseConnection => 2,
            Self::RemoveConnection => 3,
            Self::PurchaseBlockade => 4,
            Self::RemoveBlockade => 5,
            Self::DoNothing => 6,
        }
    }

    /// Inverse of [`index`](Self::index). Returns `None` when out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Whether the action needs a counterpart country.
    pub const fn is_targeted(self) -> bool {
        matches!(
            self,
            Self::PurchaseConnection
                | Self::RemoveConnection
                | Self::PurchaseBlockade
                | Self::RemoveBlockade
        )
    }

    /// Human-readable label used in logs and the terminal menu.
    pub const fn label(self) -> &'static str {
        match self {
            Self::PurchaseMine => "purchase mine",
            Self::PurchaseTown => "purchase town",
            Self::PurchaseConnection => "purchase connection",
            Self::RemoveConnection => "remove connection",
            Self::PurchaseBlockade => "purchase blockade",
            Self::RemoveBlockade => "remove blockade",
            Self::DoNothing => "end turn",
        }
    }
}

impl core::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// How a targeted action resolves its counterpart country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Pick uniformly among the eligible counterparts.
    Random,
    /// Pick by heuristic scoring biased by perception.
    Heuristic,
    /// Act on this specific country.
    Country(CountryId),
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

/// Why an action was not applied.
///
/// Rejections are ordinary outcomes, not errors: the world is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The cost exceeds the current reserve.
    InsufficientReserve,
    /// A new connection would exceed the cap for the current power level.
    ConnectionCapReached,
    /// The existing connection is already at the maximum level.
    ConnectionAtMaxLevel,
    /// No counterpart satisfies the action's preconditions.
    NoEligibleTarget,
    /// The explicit target is the acting country itself.
    SelfTarget,
}

impl core::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Self::InsufficientReserve => "insufficient reserve",
            Self::ConnectionCapReached => "connection cap reached",
            Self::ConnectionAtMaxLevel => "connection already at max level",
            Self::NoEligibleTarget => "no eligible target",
            Self::SelfTarget => "cannot target self",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_through_all() {
        for (slot, kind) in ActionKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), slot);
            assert_eq!(ActionKind::from_index(slot), Some(*kind));
        }
        assert_eq!(ActionKind::from_index(ACTION_COUNT), None);
    }

    #[test]
    fn only_graph_actions_are_targeted() {
        assert!(!ActionKind::PurchaseMine.is_targeted());
        assert!(!ActionKind::PurchaseTown.is_targeted());
        assert!(!ActionKind::DoNothing.is_targeted());
        assert!(ActionKind::PurchaseBlockade.is_targeted());
    }
}
