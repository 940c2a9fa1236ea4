//! Opponent policies and the sampling pool
//!
//! An opponent is anything that can map a lane state to an action: fixed
//! heuristic scripts or frozen snapshots of the learner's own past
//! tables. Policies receive the state already mirrored into their own
//! perspective and draw randomness from a caller-supplied RNG, so they
//! carry no mutable state and evaluation stays side-effect free.

pub mod frozen;
pub mod pool;
pub mod scripted;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    lane::{Action, LaneState},
};

/// A second-player behavior: state in, action out.
pub trait OpponentPolicy: Send {
    /// Human-readable policy name for reports and logs.
    fn name(&self) -> &str;

    /// Choose an action for `state` (already in this policy's own
    /// perspective) from the legal set.
    fn choose(&self, state: &LaneState, legal: &[Action], rng: &mut StdRng) -> Result<Action>;
}

/// How a pool entry came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Hand-written heuristic.
    Scripted,
    /// Frozen snapshot of a learner's value table.
    Snapshot,
}

pub use frozen::FrozenPolicy;
pub use pool::{OpponentPool, PoolEntry};
pub use scripted::{AlwaysFreeze, AlwaysPush, SafeFarmer, UniformRandom};
