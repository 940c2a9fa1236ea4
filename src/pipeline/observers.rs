//! Observer adapters for training monitoring
//!
//! Concrete implementations of the [`Observer`] port: a progress bar for
//! interactive runs and a metrics collector whose histories feed external
//! plotting collaborators.

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    lane::LaneOutcome,
    ports::{EpisodeSummary, Observer},
};

/// Progress bar observer - shows a live W/D/L tally while training.
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    wins: usize,
    draws: usize,
    losses: usize,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            wins: 0,
            draws: 0,
            losses: 0,
        }
    }

    fn tally(&self) -> String {
        format!("{} D:{} L:{}", self.wins, self.draws, self.losses)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (W:{msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        match summary.outcome {
            LaneOutcome::Win => self.wins += 1,
            LaneOutcome::Draw => self.draws += 1,
            LaneOutcome::Loss => self.losses += 1,
        }
        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(self.tally());
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.tally());
        }
        Ok(())
    }
}

/// Point-in-time summary of collected training metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub mean_reward: f64,
    pub final_epsilon: f64,
}

/// Metrics observer - accumulates per-episode reward and exploration-rate
/// histories for plotting, plus running outcome counts.
#[derive(Debug, Default)]
pub struct MetricsObserver {
    wins: usize,
    draws: usize,
    losses: usize,
    rewards: Vec<f64>,
    epsilons: Vec<f64>,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total agent reward per episode, in order.
    pub fn reward_history(&self) -> &[f64] {
        &self.rewards
    }

    /// Exploration rate per episode, in order.
    pub fn epsilon_history(&self) -> &[f64] {
        &self.epsilons
    }

    /// Fraction of episodes won so far.
    pub fn win_rate(&self) -> f64 {
        if self.rewards.is_empty() {
            0.0
        } else {
            self.wins as f64 / self.rewards.len() as f64
        }
    }

    /// Snapshot of all collected metrics.
    pub fn summary(&self) -> MetricsSummary {
        let episodes = self.rewards.len();
        MetricsSummary {
            episodes,
            wins: self.wins,
            draws: self.draws,
            losses: self.losses,
            win_rate: self.win_rate(),
            mean_reward: if episodes == 0 {
                0.0
            } else {
                self.rewards.iter().sum::<f64>() / episodes as f64
            },
            final_epsilon: self.epsilons.last().copied().unwrap_or(0.0),
        }
    }
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        match summary.outcome {
            LaneOutcome::Win => self.wins += 1,
            LaneOutcome::Draw => self.draws += 1,
            LaneOutcome::Loss => self.losses += 1,
        }
        self.rewards.push(summary.agent_reward);
        self.epsilons.push(summary.epsilon);
        Ok(())
    }
}
