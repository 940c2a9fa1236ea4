//! Tabular Q-learning over the lane Markov game
//!
//! Off-policy TD control: the agent learns Q* estimates from observed
//! transitions while following an ε-greedy behavior policy,
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α [ r + γ max_a' Q(s',a') − Q(s,a) ]
//! ```
//!
//! with a zero bootstrap on terminal transitions. The exploration rate is
//! owned by the agent but decayed externally by the trainer.

pub mod agent;
pub mod q_table;
pub mod serialization;

pub use agent::QLearningAgent;
pub use q_table::QTable;
pub use serialization::{PolicyExport, SavedAgent};
