//! Lane actions and the wave-control cycle

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One player's wave-management decision for a single step.
///
/// Both players commit an action simultaneously; there is no turn order.
/// `Recall` is only legal while below full health, every other action is
/// legal in any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Slow push: nudge the wave forward and build a stack.
    Push,
    /// Hard push: crash the wave, chip plates, stand exposed.
    Shove,
    /// Hold the wave near own tower and deny farm.
    Freeze,
    /// Passive farming; no wave pressure, no trade.
    LastHit,
    /// Leave lane to reset health; the wave crashes back while absent.
    Recall,
}

/// All actions in canonical (index) order.
pub const ACTIONS: [Action; 5] = [
    Action::Push,
    Action::Shove,
    Action::Freeze,
    Action::LastHit,
    Action::Recall,
];

impl Action {
    /// Canonical index, used for deterministic tie-breaking and persistence.
    pub fn index(self) -> usize {
        match self {
            Action::Push => 0,
            Action::Shove => 1,
            Action::Freeze => 2,
            Action::LastHit => 3,
            Action::Recall => 4,
        }
    }

    /// Stable textual identifier used in serialized policy keys.
    pub fn id(self) -> &'static str {
        match self {
            Action::Push => "push",
            Action::Shove => "shove",
            Action::Freeze => "freeze",
            Action::LastHit => "last_hit",
            Action::Recall => "recall",
        }
    }

    /// Parse a textual identifier produced by [`Action::id`].
    pub fn from_id(token: &str) -> Result<Self> {
        ACTIONS
            .iter()
            .copied()
            .find(|a| a.id() == token)
            .ok_or_else(|| Error::UnknownAction {
                token: token.to_string(),
            })
    }

    /// Wave displacement contributed by this action, in the acting
    /// player's own frame (positive = toward the enemy tower).
    pub fn wave_delta(self) -> i8 {
        match self {
            Action::Push => 1,
            Action::Shove => 2,
            Action::Freeze => -1,
            Action::LastHit => 0,
            Action::Recall => -2,
        }
    }

    /// Whether this action wins the farm trade against `other`.
    ///
    /// The three wave-control actions form a cycle: Shove beats Push,
    /// Freeze beats Shove, Push beats Freeze. `LastHit` and `Recall`
    /// trade neutrally against everything.
    pub fn beats(self, other: Action) -> bool {
        matches!(
            (self, other),
            (Action::Shove, Action::Push)
                | (Action::Freeze, Action::Shove)
                | (Action::Push, Action::Freeze)
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_canonical_order() {
        for (i, action) in ACTIONS.iter().enumerate() {
            assert_eq!(action.index(), i);
        }
    }

    #[test]
    fn id_round_trips() {
        for action in ACTIONS {
            assert_eq!(Action::from_id(action.id()).unwrap(), action);
        }
    }

    #[test]
    fn from_id_rejects_unknown_token() {
        let err = Action::from_id("teleport").unwrap_err();
        assert!(matches!(err, Error::UnknownAction { .. }));
    }

    #[test]
    fn trade_cycle_is_antisymmetric() {
        for a in ACTIONS {
            for b in ACTIONS {
                assert!(!(a.beats(b) && b.beats(a)), "{a} and {b} both win");
            }
        }
        assert!(Action::Shove.beats(Action::Push));
        assert!(Action::Freeze.beats(Action::Shove));
        assert!(Action::Push.beats(Action::Freeze));
        assert!(!Action::LastHit.beats(Action::Push));
        assert!(!Action::Push.beats(Action::Recall));
    }
}
