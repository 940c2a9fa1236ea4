//! Training pipeline: episode loop, self-play snapshots, exploration decay

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    lane::{LaneEnv, LaneOutcome},
    opponents::OpponentPool,
    ports::{EpisodeSummary, Observer},
    q_learning::QLearningAgent,
};

use rand::{SeedableRng, rngs::StdRng};

/// Exploration-rate schedule: exponential decay toward a floor,
/// applied once per episode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExplorationSchedule {
    /// Rate for the first episode.
    pub initial: f64,
    /// Multiplicative decay per episode.
    pub decay: f64,
    /// Lower bound the rate never drops below.
    pub floor: f64,
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        Self {
            initial: 0.5,
            decay: 0.995,
            floor: 0.05,
        }
    }
}

impl ExplorationSchedule {
    /// Validate all three constants.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Error::InvalidConfiguration { message };
        if !self.initial.is_finite() || !(0.0..=1.0).contains(&self.initial) {
            return Err(invalid(format!(
                "initial_exploration_rate must be in [0, 1], got {}",
                self.initial
            )));
        }
        if !self.decay.is_finite() || self.decay <= 0.0 || self.decay > 1.0 {
            return Err(invalid(format!(
                "exploration_decay must be in (0, 1], got {}",
                self.decay
            )));
        }
        if !self.floor.is_finite() || self.floor < 0.0 || self.floor > self.initial {
            return Err(invalid(format!(
                "exploration_floor must be in [0, initial], got {}",
                self.floor
            )));
        }
        Ok(())
    }

    /// One decay step.
    pub fn next(&self, epsilon: f64) -> f64 {
        (epsilon * self.decay).max(self.floor)
    }
}

/// Configuration for one training run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Number of training episodes.
    pub episodes: usize,
    /// Push an agent snapshot into the pool every this many episodes;
    /// 0 disables self-play snapshots.
    pub snapshot_interval: usize,
    /// Sampling weight given to each pushed snapshot.
    pub snapshot_weight: f64,
    /// Exploration-rate schedule.
    pub exploration: ExplorationSchedule,
    /// Master seed; sub-seeds for the agent, pool, environment, and
    /// opponent RNG are derived from it. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            episodes: 2000,
            snapshot_interval: 100,
            snapshot_weight: 1.0,
            exploration: ExplorationSchedule::default(),
            seed: None,
        }
    }
}

impl TrainerConfig {
    /// Validate the run configuration.
    pub fn validate(&self) -> Result<()> {
        if self.episodes == 0 {
            return Err(Error::InvalidConfiguration {
                message: "episode_count must be at least 1".to_string(),
            });
        }
        if !self.snapshot_weight.is_finite() || self.snapshot_weight < 0.0 {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "snapshot_weight must be finite and non-negative, got {}",
                    self.snapshot_weight
                ),
            });
        }
        self.exploration.validate()
    }
}

/// Result of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Total episodes played.
    pub episodes: usize,
    /// Episodes won.
    pub wins: usize,
    /// Episodes drawn.
    pub draws: usize,
    /// Episodes lost.
    pub losses: usize,
    /// Win rate.
    pub win_rate: f64,
    /// Draw rate.
    pub draw_rate: f64,
    /// Loss rate.
    pub loss_rate: f64,
    /// Mean total agent reward per episode.
    pub mean_reward: f64,
    /// Exploration rate after the final decay.
    pub final_epsilon: f64,
}

impl TrainingResult {
    fn new(
        episodes: usize,
        wins: usize,
        draws: usize,
        losses: usize,
        total_reward: f64,
        final_epsilon: f64,
    ) -> Self {
        let rate = |n: usize| {
            if episodes > 0 {
                n as f64 / episodes as f64
            } else {
                0.0
            }
        };
        Self {
            episodes,
            wins,
            draws,
            losses,
            win_rate: rate(wins),
            draw_rate: rate(draws),
            loss_rate: rate(losses),
            mean_reward: if episodes > 0 {
                total_reward / episodes as f64
            } else {
                0.0
            },
            final_epsilon,
        }
    }

    /// Save the result to a JSON file.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load a result from a JSON file.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Drives one training run: reset, sample opponent, roll out, update,
/// decay, snapshot.
///
/// Errors local to an episode (an opponent returning an illegal action)
/// propagate to the caller; [`Error::StateSpaceViolation`] from the
/// environment aborts the run immediately with the offending state
/// attached, since it indicates a modeling bug rather than a recoverable
/// condition.
pub struct Trainer {
    config: TrainerConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl Trainer {
    /// Create a trainer after validating the configuration.
    pub fn new(config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            observers: Vec::new(),
        })
    }

    /// Attach an observer to the run.
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Run the configured number of episodes.
    pub fn run(
        &mut self,
        env: &mut LaneEnv,
        agent: &mut QLearningAgent,
        pool: &mut OpponentPool,
    ) -> Result<TrainingResult> {
        let mut opponent_rng = self.seed_components(env, agent, pool);
        agent.set_epsilon(self.config.exploration.initial);

        let mut wins = 0;
        let mut draws = 0;
        let mut losses = 0;
        let mut total_reward = 0.0;

        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes)?;
        }

        for episode in 0..self.config.episodes {
            let opponent_index = pool.sample()?;
            let summary =
                run_episode(env, agent, pool, opponent_index, episode, &mut opponent_rng)?;

            match summary.outcome {
                LaneOutcome::Win => wins += 1,
                LaneOutcome::Draw => draws += 1,
                LaneOutcome::Loss => losses += 1,
            }
            total_reward += summary.agent_reward;

            agent.set_epsilon(self.config.exploration.next(agent.epsilon()));

            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }

            if self.config.snapshot_interval > 0
                && (episode + 1).is_multiple_of(self.config.snapshot_interval)
            {
                pool.push_snapshot(
                    format!("snapshot-{:06}", episode + 1),
                    agent.snapshot(),
                    self.config.snapshot_weight,
                )?;
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        Ok(TrainingResult::new(
            self.config.episodes,
            wins,
            draws,
            losses,
            total_reward,
            agent.epsilon(),
        ))
    }

    /// Derive sub-seeds for every random component from the master seed.
    fn seed_components(
        &self,
        env: &mut LaneEnv,
        agent: &mut QLearningAgent,
        pool: &mut OpponentPool,
    ) -> StdRng {
        match self.config.seed {
            Some(seed) => {
                agent.reseed(seed);
                pool.reseed(seed.wrapping_add(1));
                env.reseed(seed.wrapping_add(2));
                StdRng::seed_from_u64(seed.wrapping_add(3))
            }
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}

/// Roll out a single episode against the sampled opponent, feeding every
/// transition to the agent.
fn run_episode(
    env: &mut LaneEnv,
    agent: &mut QLearningAgent,
    pool: &OpponentPool,
    opponent_index: usize,
    episode: usize,
    opponent_rng: &mut StdRng,
) -> Result<EpisodeSummary> {
    let entry = pool
        .entry(opponent_index)
        .ok_or(Error::EmptyOpponentPool)?;

    let mut state = env.reset();
    let mut agent_reward = 0.0;
    let mut opponent_reward = 0.0;
    let max_steps = env.params().max_steps as usize;

    for step in 0..max_steps {
        let legal = state.legal_actions();
        let agent_action = agent.select_action(&state, &legal)?;

        let mirrored = state.mirrored();
        let opponent_legal = mirrored.legal_actions();
        let opponent_action = entry
            .policy
            .choose(&mirrored, &opponent_legal, opponent_rng)?;

        let out = env.step(&state, agent_action, opponent_action)?;
        let done = out.done();
        let next_legal = if done {
            Vec::new()
        } else {
            out.next.legal_actions()
        };
        agent.update(
            &state,
            agent_action,
            out.agent.reward,
            &out.next,
            &next_legal,
            done,
        );

        agent_reward += out.agent.reward;
        opponent_reward += out.opponent.reward;
        state = out.next;

        if let Some(terminal) = out.terminal {
            return Ok(EpisodeSummary {
                episode,
                opponent_id: entry.id.clone(),
                steps: step + 1,
                agent_reward,
                opponent_reward,
                epsilon: agent.epsilon(),
                outcome: LaneOutcome::from_terminal(&state, terminal),
                terminal,
            });
        }
    }

    // The environment's horizon terminal fires at max_steps; falling out
    // of the loop without one means the transition contract was broken.
    Err(Error::StateSpaceViolation {
        state: state.encode(),
        detail: "episode exceeded the horizon without a terminal".to_string(),
    })
}
