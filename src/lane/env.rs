//! The two-player lane environment
//!
//! A discrete-time Markov game over bucketed lane states. Both players act
//! simultaneously each step; stochasticity enters through gank occurrence
//! and the per-step jungle-vision draw. The environment holds no episode
//! state of its own beyond the RNG: callers own the current [`LaneState`]
//! and feed it back into [`LaneEnv::step`].

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    lane::{
        action::Action,
        state::{HP_FULL, LaneState, STACK_MAX, WAVE_MAX},
    },
    utils::bernoulli,
};

/// Relative weights of the three reward components.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RewardWeights {
    /// Weight per unit of farm swing (trades and denies).
    pub farm: f64,
    /// Weight per turret plate taken or conceded.
    pub plate: f64,
    /// Penalty per health tier lost to a gank.
    pub risk: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            farm: 0.4,
            plate: 0.6,
            risk: 5.0,
        }
    }
}

/// Fixed parameters of the lane model.
///
/// All stochastic and reward constants live here so that the environment,
/// the agent, and the evaluator share one description of the game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LaneParams {
    /// Episode horizon: the step-count cap.
    pub max_steps: u8,
    /// Farm-lead tier cap (gold bucket runs `-gold_cap ..= gold_cap`).
    pub gold_cap: i8,
    /// Plates on each outer turret at lane start.
    pub plates: u8,
    /// Farm units won by the favourable side of a trade.
    pub trade_edge: f64,
    /// Extra farm units denied when freezing against a pushing opponent.
    pub deny_bonus: f64,
    /// Probability of having jungle vision on any given step.
    pub ward_prob: f64,
    /// Baseline gank probability without vision.
    pub gank_base: f64,
    /// Added gank probability when overextended at the enemy tower.
    pub gank_overextend: f64,
    /// Added gank probability while shoving.
    pub gank_shove: f64,
    /// Reward component weights.
    pub weights: RewardWeights,
    /// Flat per-step bonus to the agent side, modelling positional
    /// advantage. Zero keeps the game exactly zero-sum outside ganks.
    pub advantage_bias: f64,
}

impl Default for LaneParams {
    fn default() -> Self {
        Self {
            max_steps: 40,
            gold_cap: 3,
            plates: 3,
            trade_edge: 0.75,
            deny_bonus: 0.5,
            ward_prob: 0.6,
            gank_base: 0.05,
            gank_overextend: 0.20,
            gank_shove: 0.15,
            weights: RewardWeights::default(),
            advantage_bias: 0.0,
        }
    }
}

impl LaneParams {
    /// Validate every numeric field up front.
    ///
    /// Rejecting NaN weights and out-of-range probabilities here keeps
    /// numeric nonsense out of the episode loop entirely.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Error::InvalidConfiguration { message };

        if self.max_steps == 0 {
            return Err(invalid("max_steps must be at least 1".into()));
        }
        if self.gold_cap < 1 {
            return Err(invalid("gold_cap must be at least 1".into()));
        }
        if self.plates == 0 {
            return Err(invalid("plates must be at least 1".into()));
        }
        for (name, value) in [
            ("trade_edge", self.trade_edge),
            ("deny_bonus", self.deny_bonus),
            ("reward_weights.farm", self.weights.farm),
            ("reward_weights.plate", self.weights.plate),
            ("reward_weights.risk", self.weights.risk),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("ward_prob", self.ward_prob),
            ("gank_base", self.gank_base),
            ("gank_overextend", self.gank_overextend),
            ("gank_shove", self.gank_shove),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!(
                    "{name} must be a probability in [0, 1], got {value}"
                )));
            }
        }
        if !self.advantage_bias.is_finite() {
            return Err(invalid(format!(
                "advantage_bias must be finite, got {}",
                self.advantage_bias
            )));
        }
        Ok(())
    }
}

/// Which side of the matchup an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Agent,
    Opponent,
}

/// Why an episode ended.
///
/// This set is exhaustive and checked in a fixed order: plate terminals
/// first (enemy turret before ally turret), then forced recalls (agent
/// before opponent), then the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    /// The named side's outer turret ran out of plates.
    PlatesExhausted(Role),
    /// The named side hit health tier 0 with no wave presence.
    ForcedRecall(Role),
    /// The step-count cap was reached.
    HorizonReached,
}

/// Episode outcome from the agent's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneOutcome {
    Win,
    Loss,
    Draw,
}

impl LaneOutcome {
    /// Derive the binary outcome from a terminal state and its reason.
    ///
    /// Losing a turret's plates or being forced out of lane decides the
    /// episode outright; at the horizon the gold lead breaks the tie.
    pub fn from_terminal(state: &LaneState, reason: TerminalReason) -> Self {
        match reason {
            TerminalReason::PlatesExhausted(Role::Opponent)
            | TerminalReason::ForcedRecall(Role::Opponent) => LaneOutcome::Win,
            TerminalReason::PlatesExhausted(Role::Agent)
            | TerminalReason::ForcedRecall(Role::Agent) => LaneOutcome::Loss,
            TerminalReason::HorizonReached => match state.gold.cmp(&0) {
                std::cmp::Ordering::Greater => LaneOutcome::Win,
                std::cmp::Ordering::Less => LaneOutcome::Loss,
                std::cmp::Ordering::Equal => LaneOutcome::Draw,
            },
        }
    }
}

/// Per-player breakdown of a single step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlayerStep {
    /// Net farm swing in this player's favour, in farm units.
    pub farm_delta: f64,
    /// Enemy plates taken this step.
    pub plates_taken: u8,
    /// Own plates conceded this step.
    pub plates_lost: u8,
    /// Whether this player was ganked.
    pub ganked: bool,
    /// Weighted scalar reward.
    pub reward: f64,
}

/// Result of one joint step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StepOutcome {
    /// Next state, from the agent's perspective.
    pub next: LaneState,
    /// Agent-side reward breakdown.
    pub agent: PlayerStep,
    /// Opponent-side reward breakdown.
    pub opponent: PlayerStep,
    /// Set when the episode ended on this step.
    pub terminal: Option<TerminalReason>,
}

impl StepOutcome {
    /// Whether the episode ended on this step.
    pub fn done(&self) -> bool {
        self.terminal.is_some()
    }
}

/// The lane simulation.
///
/// Owns the model parameters and a seeded RNG; all other state is carried
/// by the caller. Given the same seed and the same joint action sequence,
/// [`reset`](LaneEnv::reset) and [`step`](LaneEnv::step) reproduce the
/// same trajectory exactly.
#[derive(Debug)]
pub struct LaneEnv {
    params: LaneParams,
    rng: StdRng,
}

impl LaneEnv {
    /// Create an environment with entropy-seeded randomness.
    pub fn new(params: LaneParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            rng: StdRng::from_rng(&mut rand::rng()),
        })
    }

    /// Create an environment with a fixed seed for reproducible runs.
    pub fn with_seed(params: LaneParams, seed: u64) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Replace the RNG with a freshly seeded one.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Model parameters.
    pub fn params(&self) -> &LaneParams {
        &self.params
    }

    /// Start a new episode: even wave, full health, full plates, turn 0.
    ///
    /// The only randomness is the initial jungle-vision draw for each
    /// player (ally first, then enemy).
    pub fn reset(&mut self) -> LaneState {
        LaneState {
            wave: 0,
            stack_ally: 0,
            stack_enemy: 0,
            hp_ally: HP_FULL,
            hp_enemy: HP_FULL,
            gold: 0,
            plates_ally: self.params.plates,
            plates_enemy: self.params.plates,
            ward_ally: bernoulli(&mut self.rng, self.params.ward_prob),
            ward_enemy: bernoulli(&mut self.rng, self.params.ward_prob),
            turn: 0,
        }
    }

    /// Gank probability for a player at wave position `wave_own` (own
    /// frame) taking `action`, with or without jungle vision.
    fn gank_probability(&self, wave_own: i8, ward: bool, action: Action) -> f64 {
        if ward || action == Action::Recall {
            return 0.0;
        }
        let p = self.params.gank_base
            + if wave_own == WAVE_MAX {
                self.params.gank_overextend
            } else {
                0.0
            }
            + if action == Action::Shove {
                self.params.gank_shove
            } else {
                0.0
            };
        p.clamp(0.0, 1.0)
    }

    /// Advance the lane by one joint step.
    ///
    /// `state` is the agent's view; `opponent_action` is interpreted in the
    /// opponent's own frame (the frame of `state.mirrored()`). Both actions
    /// are legality-checked before any RNG draw, so a rejected step leaves
    /// the random stream untouched. RNG draw order within a step is fixed:
    /// agent gank, opponent gank, ally ward, enemy ward.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAction`] for an illegal action (never substituted),
    /// [`Error::EpisodeOver`] when stepping a state at the horizon, and
    /// [`Error::StateSpaceViolation`] if the produced state leaves the
    /// bucket domain (a modeling bug; fatal to the caller's run).
    pub fn step(
        &mut self,
        state: &LaneState,
        agent_action: Action,
        opponent_action: Action,
    ) -> Result<StepOutcome> {
        if state.turn >= self.params.max_steps {
            return Err(Error::EpisodeOver {
                state: state.encode(),
            });
        }
        if !state.is_action_legal(agent_action) {
            return Err(Error::InvalidAction {
                action: agent_action,
                state: state.encode(),
            });
        }
        let mirrored = state.mirrored();
        if !mirrored.is_action_legal(opponent_action) {
            return Err(Error::InvalidAction {
                action: opponent_action,
                state: mirrored.encode(),
            });
        }

        let params = &self.params;
        let weights = &params.weights;

        // Wave resolution in the agent frame.
        let raw_wave = state.wave + agent_action.wave_delta() - opponent_action.wave_delta();
        let wave_next = raw_wave.clamp(-WAVE_MAX, WAVE_MAX);

        // Net farm swing, agent-positive. The trade edge is antisymmetric
        // by construction and each deny credits one side while debiting the
        // other, so the farm component conserves exactly.
        let edge = if agent_action.beats(opponent_action) {
            params.trade_edge
        } else if opponent_action.beats(agent_action) {
            -params.trade_edge
        } else {
            0.0
        };
        let deny_agent = freeze_deny(state.wave, agent_action, opponent_action, params);
        let deny_opponent = freeze_deny(-state.wave, opponent_action, agent_action, params);
        let farm_swing = edge + deny_agent - deny_opponent;

        // Plate damage, per side in its own frame.
        let taken_agent = plates_taken(
            state.wave,
            wave_next,
            state.stack_ally,
            agent_action,
            state.plates_enemy,
        );
        let taken_opponent = plates_taken(
            -state.wave,
            -wave_next,
            state.stack_enemy,
            opponent_action,
            state.plates_ally,
        );

        // Gank resolution uses the pre-step wave and vision.
        let p_gank_agent = self.gank_probability(state.wave, state.ward_ally, agent_action);
        let p_gank_opponent =
            self.gank_probability(-state.wave, state.ward_enemy, opponent_action);
        let ganked_agent = bernoulli(&mut self.rng, p_gank_agent);
        let ganked_opponent = bernoulli(&mut self.rng, p_gank_opponent);

        let plate_swing = f64::from(taken_agent) - f64::from(taken_opponent);
        let reward_agent = weights.farm * farm_swing + weights.plate * plate_swing
            - weights.risk * f64::from(u8::from(ganked_agent))
            + params.advantage_bias;
        let reward_opponent = weights.farm * -farm_swing + weights.plate * -plate_swing
            - weights.risk * f64::from(u8::from(ganked_opponent));

        // Gold lead follows the reward swing, discretized to whole tiers.
        let gold_shift = (reward_agent - reward_opponent).round() as i64;
        let gold_next = (i64::from(state.gold) + gold_shift)
            .clamp(i64::from(-params.gold_cap), i64::from(params.gold_cap))
            as i8;

        let next = LaneState {
            wave: wave_next,
            stack_ally: update_stack(state.stack_ally, agent_action, wave_next),
            stack_enemy: update_stack(state.stack_enemy, opponent_action, -wave_next),
            hp_ally: next_health(state.hp_ally, agent_action, ganked_agent),
            hp_enemy: next_health(state.hp_enemy, opponent_action, ganked_opponent),
            gold: gold_next,
            plates_ally: state.plates_ally - taken_opponent,
            plates_enemy: state.plates_enemy - taken_agent,
            ward_ally: bernoulli(&mut self.rng, params.ward_prob),
            ward_enemy: bernoulli(&mut self.rng, params.ward_prob),
            turn: state.turn + 1,
        };
        next.validate(params)?;

        let terminal = self.terminal_reason(&next);

        Ok(StepOutcome {
            next,
            agent: PlayerStep {
                farm_delta: farm_swing,
                plates_taken: taken_agent,
                plates_lost: taken_opponent,
                ganked: ganked_agent,
                reward: reward_agent,
            },
            opponent: PlayerStep {
                farm_delta: -farm_swing,
                plates_taken: taken_opponent,
                plates_lost: taken_agent,
                ganked: ganked_opponent,
                reward: reward_opponent,
            },
            terminal,
        })
    }

    fn terminal_reason(&self, next: &LaneState) -> Option<TerminalReason> {
        if next.plates_enemy == 0 {
            Some(TerminalReason::PlatesExhausted(Role::Opponent))
        } else if next.plates_ally == 0 {
            Some(TerminalReason::PlatesExhausted(Role::Agent))
        } else if next.hp_ally == 0 && next.stack_ally == 0 {
            Some(TerminalReason::ForcedRecall(Role::Agent))
        } else if next.hp_enemy == 0 && next.stack_enemy == 0 {
            Some(TerminalReason::ForcedRecall(Role::Opponent))
        } else if next.turn >= self.params.max_steps {
            Some(TerminalReason::HorizonReached)
        } else {
            None
        }
    }
}

/// Farm units denied by freezing with the wave near own tower.
fn freeze_deny(wave_own: i8, action: Action, other: Action, params: &LaneParams) -> f64 {
    if action == Action::Freeze && wave_own <= -1 {
        1.0 + if matches!(other, Action::Push | Action::Shove) {
            params.deny_bonus
        } else {
            0.0
        }
    } else {
        0.0
    }
}

/// Plates taken from the enemy turret this step, in the taker's own frame.
///
/// Shoving from a pushed position chips one plate; a full-stack wave
/// crashing into the tower takes one more. Capped by what remains.
fn plates_taken(
    wave_own: i8,
    wave_next_own: i8,
    stack_own: u8,
    action: Action,
    remaining: u8,
) -> u8 {
    let mut taken = 0;
    if action == Action::Shove && wave_own >= 1 {
        taken += 1;
    }
    if wave_next_own == WAVE_MAX && stack_own == STACK_MAX {
        taken += 1;
    }
    taken.min(remaining)
}

/// Minion stack update in the owner's frame.
///
/// A slow push builds the stack until the wave would crash, a shove that
/// reaches the enemy tower spends it, freezing trims it, recalling
/// abandons it.
fn update_stack(stack: u8, action: Action, wave_next_own: i8) -> u8 {
    match action {
        Action::Push if wave_next_own < WAVE_MAX => (stack + 1).min(STACK_MAX),
        Action::Shove if wave_next_own == WAVE_MAX => 0,
        Action::Freeze => stack.saturating_sub(1),
        Action::Recall => 0,
        _ => stack,
    }
}

/// Health tier after this step: recalling restores to full, a gank costs
/// one tier.
fn next_health(hp: u8, action: Action, ganked: bool) -> u8 {
    if action == Action::Recall {
        HP_FULL
    } else if ganked {
        hp.saturating_sub(1)
    } else {
        hp
    }
}
