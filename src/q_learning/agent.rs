//! The tabular Q-learning agent

use rand::{Rng, SeedableRng, prelude::IndexedRandom, rngs::StdRng};

use crate::{
    error::{Error, Result},
    lane::{Action, LaneState},
    opponents::FrozenPolicy,
    q_learning::q_table::QTable,
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Q-learning agent: ε-greedy action selection over an owned [`QTable`].
///
/// The exploration rate is plain mutable state; its decay schedule is a
/// trainer concern, not an agent invariant. Snapshots are independent
/// deep copies, safe to hand to the opponent pool while training
/// continues on the live table.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    epsilon: f64,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl QLearningAgent {
    /// Create a fresh agent with an empty table and ε = 0.
    ///
    /// # Errors
    ///
    /// Propagates [`QTable::new`]'s hyperparameter validation.
    pub fn new(learning_rate: f64, discount_factor: f64, q_init: f64) -> Result<Self> {
        Ok(Self {
            q_table: QTable::new(learning_rate, discount_factor, q_init)?,
            epsilon: 0.0,
            rng: build_rng(None),
            rng_seed: None,
        })
    }

    /// Rebuild an agent around an existing table (e.g. a reloaded policy).
    pub fn from_table(q_table: QTable) -> Self {
        Self {
            q_table,
            epsilon: 0.0,
            rng: build_rng(None),
            rng_seed: None,
        }
    }

    /// Fix the action-selection RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    /// Reseed the action-selection RNG in place.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Set the exploration rate; the trainer drives decay through this.
    pub fn set_epsilon(&mut self, epsilon: f64) {
        debug_assert!(epsilon.is_finite());
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }

    /// ε-greedy selection over the legal actions.
    ///
    /// With probability ε a uniformly random legal action (explore),
    /// otherwise the table's greedy action with its deterministic
    /// lowest-index tie-break (exploit).
    pub fn select_action(&mut self, state: &LaneState, legal: &[Action]) -> Result<Action> {
        let no_legal = || Error::NoLegalActions {
            state: state.encode(),
        };
        if legal.is_empty() {
            return Err(no_legal());
        }
        if self.rng.random::<f64>() < self.epsilon {
            legal.choose(&mut self.rng).copied().ok_or_else(no_legal)
        } else {
            self.q_table.greedy_action(state, legal).ok_or_else(no_legal)
        }
    }

    /// Apply the Bellman update for one observed transition.
    pub fn update(
        &mut self,
        state: &LaneState,
        action: Action,
        reward: f64,
        next_state: &LaneState,
        next_legal: &[Action],
        done: bool,
    ) {
        self.q_table
            .q_learning_update(*state, action, reward, next_state, next_legal, done);
    }

    /// Freeze the current table into an independent greedy policy.
    ///
    /// The copy shares nothing with the live table: later updates do not
    /// show through the snapshot.
    pub fn snapshot(&self) -> FrozenPolicy {
        FrozenPolicy::new(self.q_table.clone())
    }

    /// Read access to the value table.
    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub(crate) fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }

    pub(crate) fn from_parts(q_table: QTable, epsilon: f64, rng_seed: Option<u64>) -> Self {
        Self {
            q_table,
            epsilon,
            rng: build_rng(rng_seed),
            rng_seed,
        }
    }
}
