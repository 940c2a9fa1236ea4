//! Observer port - abstraction for training monitoring
//!
//! The trainer emits one [`EpisodeSummary`] per episode; observers turn
//! that stream into progress bars, metric histories, or files without the
//! training loop knowing about any of it. External plotting and reporting
//! collaborators consume these summaries and contain no decision logic.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    lane::{LaneOutcome, TerminalReason},
};

/// Aggregate record of one training episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// Episode index (0-based).
    pub episode: usize,
    /// Which pool opponent was sampled for the episode.
    pub opponent_id: String,
    /// Steps taken before the terminal.
    pub steps: usize,
    /// Total agent reward over the episode.
    pub agent_reward: f64,
    /// Total opponent reward over the episode.
    pub opponent_reward: f64,
    /// Exploration rate the agent played the episode with.
    pub epsilon: f64,
    /// Win/loss/draw from the agent's perspective.
    pub outcome: LaneOutcome,
    /// Why the episode ended.
    pub terminal: TerminalReason,
}

/// Observer trait for monitoring training.
///
/// Methods are called in order: `on_training_start` once, then
/// `on_episode_end` after every episode, then `on_training_end` once.
/// All methods default to no-ops so observers implement only what they
/// need.
pub trait Observer: Send {
    /// Called once before the first episode.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each episode with its aggregate summary.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called once after the last episode.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
