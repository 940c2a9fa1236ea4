//! Frozen snapshots of learned policies (the self-play variant)

use rand::rngs::StdRng;

use crate::{
    error::{Error, Result},
    lane::{Action, LaneState},
    opponents::OpponentPolicy,
    q_learning::QTable,
};

/// A greedy policy over a frozen copy of a Q-table.
///
/// The table is a deep copy taken at snapshot time; the live agent can
/// keep learning without the snapshot shifting underneath the pool. Play
/// is fully greedy with the table's deterministic tie-break, so a given
/// snapshot always answers a given state the same way.
#[derive(Debug, Clone)]
pub struct FrozenPolicy {
    table: QTable,
}

impl FrozenPolicy {
    pub(crate) fn new(table: QTable) -> Self {
        Self { table }
    }

    /// Build a frozen policy from a reloaded table.
    pub fn from_table(table: QTable) -> Self {
        Self::new(table)
    }

    /// Q-value recorded for a state-action pair.
    pub fn get(&self, state: &LaneState, action: Action) -> f64 {
        self.table.get(state, action)
    }

    /// Number of entries captured in the snapshot.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the snapshot captured any values at all.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl OpponentPolicy for FrozenPolicy {
    fn name(&self) -> &str {
        "frozen-snapshot"
    }

    fn choose(&self, state: &LaneState, legal: &[Action], _rng: &mut StdRng) -> Result<Action> {
        self.table
            .greedy_action(state, legal)
            .ok_or_else(|| Error::NoLegalActions {
                state: state.encode(),
            })
    }
}
