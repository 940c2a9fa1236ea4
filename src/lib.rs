//! laneq - wave management as a Markov game
//!
//! This crate models a two-player MOBA laning phase as a discrete-time
//! Markov game over bucketed lane states and trains a tabular Q-learning
//! policy against a weighted pool of opponents, including frozen snapshots
//! of the learner's own past tables (self-play).
//!
//! It provides:
//! - A deterministic, seedable lane environment with stochastic ganks
//!   and jungle-vision draws
//! - A Q-learning agent with ε-greedy exploration and copy-on-snapshot
//!   value tables
//! - An opponent pool mixing scripted heuristics with self-play snapshots
//! - Training and evaluation pipelines with pluggable observers
//! - Policy persistence: binary agent snapshots and a portable JSON export
//!
//! ```no_run
//! use laneq::{
//!     LaneEnv, LaneParams, OpponentPool, QLearningAgent, Trainer, TrainerConfig,
//!     opponents::{AlwaysFreeze, AlwaysPush},
//! };
//!
//! # fn main() -> laneq::Result<()> {
//! let mut env = LaneEnv::with_seed(LaneParams::default(), 42)?;
//! let mut agent = QLearningAgent::new(0.15, 0.95, 0.0)?;
//! let mut pool = OpponentPool::new(8)?;
//! pool.add("always-push", Box::new(AlwaysPush), 1.0)?;
//! pool.add("always-freeze", Box::new(AlwaysFreeze), 1.0)?;
//!
//! let mut trainer = Trainer::new(TrainerConfig::default())?;
//! let result = trainer.run(&mut env, &mut agent, &mut pool)?;
//! println!("win rate: {:.2}", result.win_rate);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod lane;
pub mod opponents;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod utils;

pub use error::{Error, Result};
pub use lane::{
    Action, LaneEnv, LaneOutcome, LaneParams, LaneState, RewardWeights, Role, StepOutcome,
    TerminalReason,
};
pub use opponents::{FrozenPolicy, OpponentPolicy, OpponentPool};
pub use pipeline::{
    EvaluationReport, Evaluator, ExplorationSchedule, Trainer, TrainerConfig, TrainingResult,
};
pub use ports::{EpisodeSummary, Observer};
pub use q_learning::{PolicyExport, QLearningAgent, QTable, SavedAgent};
