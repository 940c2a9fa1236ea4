//! Greedy evaluation of a frozen policy against the opponent pool

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::{
    error::{Error, Result},
    lane::{LaneEnv, LaneOutcome, LaneParams},
    opponents::{OpponentPolicy, OpponentPool},
    q_learning::QTable,
};

/// Win/loss/draw rates over an evaluation matchup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OutcomeRate {
    pub win: f64,
    pub loss: f64,
    pub draw: f64,
}

/// Per-opponent evaluation record, consumed by external reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Pool or held-out identifier of the opponent.
    pub opponent_id: String,
    /// Episodes played in this matchup.
    pub episodes: usize,
    /// Mean total agent reward per episode.
    pub mean_reward: f64,
    /// Sample variance of the per-episode reward.
    pub reward_variance: f64,
    /// Outcome rates from the agent's perspective.
    pub outcome_rate: OutcomeRate,
}

/// Runs a frozen Q-table, fully greedy, against every opponent in the
/// pool plus any held-out heuristics.
///
/// Evaluation is side-effect free with respect to learned state: it takes
/// the table and the pool by shared reference and owns its own
/// environments and RNGs. Each matchup runs on a seed derived from the
/// evaluator seed and the opponent's position, so reports are reproducible
/// and independent of matchup order.
pub struct Evaluator {
    params: LaneParams,
    episodes_per_opponent: usize,
    seed: u64,
    held_out: Vec<(String, Box<dyn OpponentPolicy>)>,
}

impl Evaluator {
    /// Create an evaluator for the given lane model.
    pub fn new(params: LaneParams, episodes_per_opponent: usize, seed: u64) -> Result<Self> {
        params.validate()?;
        if episodes_per_opponent == 0 {
            return Err(Error::InvalidConfiguration {
                message: "episodes_per_opponent must be at least 1".to_string(),
            });
        }
        Ok(Self {
            params,
            episodes_per_opponent,
            seed,
            held_out: Vec::new(),
        })
    }

    /// Add a held-out opponent evaluated alongside the pool.
    pub fn with_held_out(
        mut self,
        id: impl Into<String>,
        policy: Box<dyn OpponentPolicy>,
    ) -> Self {
        self.held_out.push((id.into(), policy));
        self
    }

    /// Evaluate `table` against every pool entry and every held-out
    /// policy, in registration order.
    pub fn evaluate(&self, table: &QTable, pool: &OpponentPool) -> Result<Vec<EvaluationReport>> {
        let pool_matchups = pool
            .entries()
            .iter()
            .map(|e| (e.id.as_str(), e.policy.as_ref()));
        let held_out_matchups = self
            .held_out
            .iter()
            .map(|(id, policy)| (id.as_str(), policy.as_ref()));

        pool_matchups
            .chain(held_out_matchups)
            .enumerate()
            .map(|(index, (id, policy))| self.run_matchup(table, id, policy, index as u64))
            .collect()
    }

    /// Evaluate `table` against a single opponent.
    pub fn evaluate_against(
        &self,
        table: &QTable,
        opponent_id: &str,
        policy: &dyn OpponentPolicy,
    ) -> Result<EvaluationReport> {
        self.run_matchup(table, opponent_id, policy, 0)
    }

    fn run_matchup(
        &self,
        table: &QTable,
        opponent_id: &str,
        policy: &dyn OpponentPolicy,
        matchup_index: u64,
    ) -> Result<EvaluationReport> {
        let mut env = LaneEnv::with_seed(
            self.params,
            self.seed.wrapping_add(matchup_index.wrapping_mul(2)),
        )?;
        let mut opponent_rng =
            StdRng::seed_from_u64(self.seed.wrapping_add(matchup_index.wrapping_mul(2) + 1));

        let mut rewards = Vec::with_capacity(self.episodes_per_opponent);
        let mut wins = 0usize;
        let mut draws = 0usize;
        let mut losses = 0usize;

        for _ in 0..self.episodes_per_opponent {
            let (reward, outcome) = greedy_episode(&mut env, table, policy, &mut opponent_rng)?;
            rewards.push(reward);
            match outcome {
                LaneOutcome::Win => wins += 1,
                LaneOutcome::Draw => draws += 1,
                LaneOutcome::Loss => losses += 1,
            }
        }

        let episodes = rewards.len();
        let mean_reward = rewards.iter().mean();
        let reward_variance = if episodes > 1 {
            rewards.iter().variance()
        } else {
            0.0
        };
        let rate = |n: usize| n as f64 / episodes as f64;

        Ok(EvaluationReport {
            opponent_id: opponent_id.to_string(),
            episodes,
            mean_reward,
            reward_variance,
            outcome_rate: OutcomeRate {
                win: rate(wins),
                loss: rate(losses),
                draw: rate(draws),
            },
        })
    }
}

/// One fully greedy episode; returns the total agent reward and outcome.
fn greedy_episode(
    env: &mut LaneEnv,
    table: &QTable,
    policy: &dyn OpponentPolicy,
    opponent_rng: &mut StdRng,
) -> Result<(f64, LaneOutcome)> {
    let mut state = env.reset();
    let mut total = 0.0;
    let max_steps = env.params().max_steps as usize;

    for _ in 0..max_steps {
        let legal = state.legal_actions();
        let agent_action = table
            .greedy_action(&state, &legal)
            .ok_or_else(|| Error::NoLegalActions {
                state: state.encode(),
            })?;

        let mirrored = state.mirrored();
        let opponent_legal = mirrored.legal_actions();
        let opponent_action = policy.choose(&mirrored, &opponent_legal, opponent_rng)?;

        let out = env.step(&state, agent_action, opponent_action)?;
        total += out.agent.reward;
        state = out.next;

        if let Some(terminal) = out.terminal {
            return Ok((total, LaneOutcome::from_terminal(&state, terminal)));
        }
    }

    Err(Error::StateSpaceViolation {
        state: state.encode(),
        detail: "episode exceeded the horizon without a terminal".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opponents::{AlwaysFreeze, AlwaysPush, SafeFarmer};

    fn pool() -> OpponentPool {
        let mut pool = OpponentPool::new(4).unwrap().with_seed(3);
        pool.add("always-push", Box::new(AlwaysPush), 1.0).unwrap();
        pool.add("always-freeze", Box::new(AlwaysFreeze), 1.0)
            .unwrap();
        pool
    }

    #[test]
    fn zero_episode_budget_is_rejected() {
        assert!(Evaluator::new(LaneParams::default(), 0, 1).is_err());
    }

    #[test]
    fn reports_cover_pool_and_held_out_opponents() {
        let evaluator = Evaluator::new(LaneParams::default(), 10, 9)
            .unwrap()
            .with_held_out("safe-farmer", Box::new(SafeFarmer));
        let table = QTable::new(0.2, 0.95, 0.0).unwrap();

        let reports = evaluator.evaluate(&table, &pool()).unwrap();

        let ids: Vec<&str> = reports.iter().map(|r| r.opponent_id.as_str()).collect();
        assert_eq!(ids, ["always-push", "always-freeze", "safe-farmer"]);
        for report in &reports {
            assert_eq!(report.episodes, 10);
            assert!(report.mean_reward.is_finite());
            assert!(report.reward_variance >= 0.0);
            let total =
                report.outcome_rate.win + report.outcome_rate.loss + report.outcome_rate.draw;
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn evaluation_is_reproducible() {
        let table = QTable::new(0.2, 0.95, 0.0).unwrap();
        let run = || {
            let evaluator = Evaluator::new(LaneParams::default(), 20, 77).unwrap();
            let reports = evaluator.evaluate(&table, &pool()).unwrap();
            reports
                .into_iter()
                .map(|r| (r.opponent_id, r.mean_reward, r.outcome_rate.win))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn single_matchup_evaluation() {
        let table = QTable::new(0.2, 0.95, 0.0).unwrap();
        let evaluator = Evaluator::new(LaneParams::default(), 15, 21).unwrap();

        let report = evaluator
            .evaluate_against(&table, "safe-farmer", &SafeFarmer)
            .unwrap();

        assert_eq!(report.opponent_id, "safe-farmer");
        assert_eq!(report.episodes, 15);
        assert!(report.mean_reward.is_finite());
    }

    #[test]
    fn evaluation_leaves_pool_untouched() {
        let table = QTable::new(0.2, 0.95, 0.0).unwrap();
        let pool = pool();
        let ids_before: Vec<String> = pool.entries().iter().map(|e| e.id.clone()).collect();

        let evaluator = Evaluator::new(LaneParams::default(), 5, 1).unwrap();
        evaluator.evaluate(&table, &pool).unwrap();

        let ids_after: Vec<String> = pool.entries().iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids_before, ids_after);
        assert_eq!(table.len(), 0, "evaluation must not write to the table");
    }
}
