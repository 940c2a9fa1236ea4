//! Q-table over bucketed lane states

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    lane::{Action, LaneState},
};

/// Q-table mapping (state, action) pairs to expected-return estimates.
///
/// Unvisited pairs read as `q_init` until their first update. The table is
/// the sole artifact produced by training and consumed by evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QTable {
    /// Q-values: (state, action) -> estimate
    q_values: HashMap<(LaneState, Action), f64>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
    /// Initial Q-value for unseen state-action pairs
    q_init: f64,
}

impl QTable {
    /// Create an empty Q-table.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when α is outside `(0, 1]`, γ outside
    /// `[0, 1)`, or `q_init` is not finite.
    pub fn new(learning_rate: f64, discount_factor: f64, q_init: f64) -> Result<Self> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 || learning_rate > 1.0 {
            return Err(Error::InvalidConfiguration {
                message: format!("learning_rate must be in (0, 1], got {learning_rate}"),
            });
        }
        if !discount_factor.is_finite() || !(0.0..1.0).contains(&discount_factor) {
            return Err(Error::InvalidConfiguration {
                message: format!("discount_factor must be in [0, 1), got {discount_factor}"),
            });
        }
        if !q_init.is_finite() {
            return Err(Error::InvalidConfiguration {
                message: format!("q_init must be finite, got {q_init}"),
            });
        }
        Ok(Self {
            q_values: HashMap::new(),
            learning_rate,
            discount_factor,
            q_init,
        })
    }

    /// Get the Q-value for a state-action pair.
    pub fn get(&self, state: &LaneState, action: Action) -> f64 {
        *self.q_values.get(&(*state, action)).unwrap_or(&self.q_init)
    }

    /// Set the Q-value for a state-action pair.
    pub fn set(&mut self, state: LaneState, action: Action, value: f64) {
        self.q_values.insert((state, action), value);
    }

    /// Maximum Q-value over the given legal actions.
    pub fn max_q(&self, state: &LaneState, legal: &[Action]) -> f64 {
        legal
            .iter()
            .map(|&action| self.get(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Greedy action over the given legal actions.
    ///
    /// Ties break deterministically toward the lowest action index, so a
    /// frozen policy replays identically across runs. `None` only for an
    /// empty legal set.
    pub fn greedy_action(&self, state: &LaneState, legal: &[Action]) -> Option<Action> {
        let mut best: Option<(Action, f64)> = None;
        for &action in legal {
            let q = self.get(state, action);
            let replace = match best {
                Some((incumbent, best_q)) => {
                    q > best_q || (q == best_q && action.index() < incumbent.index())
                }
                None => true,
            };
            if replace {
                best = Some((action, q));
            }
        }
        best.map(|(action, _)| action)
    }

    /// Q-learning update: off-policy TD control.
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// Terminal transitions bootstrap from zero.
    pub fn q_learning_update(
        &mut self,
        state: LaneState,
        action: Action,
        reward: f64,
        next_state: &LaneState,
        next_legal: &[Action],
        done: bool,
    ) {
        let current_q = self.get(&state, action);
        let max_next_q = if done || next_legal.is_empty() {
            0.0
        } else {
            self.max_q(next_state, next_legal)
        };
        let td_target = reward + self.discount_factor * max_next_q;
        let td_error = td_target - current_q;
        let new_q = current_q + self.learning_rate * td_error;
        self.set(state, action, new_q);
    }

    /// Number of stored Q-values.
    pub fn len(&self) -> usize {
        self.q_values.len()
    }

    /// Whether any value has been written yet.
    pub fn is_empty(&self) -> bool {
        self.q_values.is_empty()
    }

    /// Learning rate α.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Discount factor γ.
    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// Default value for unseen pairs.
    pub fn q_init(&self) -> f64 {
        self.q_init
    }

    /// Iterate over stored entries in arbitrary order.
    pub fn entries(&self) -> impl Iterator<Item = (&(LaneState, Action), &f64)> {
        self.q_values.iter()
    }
}
