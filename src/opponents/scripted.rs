//! Fixed heuristic opponents

use rand::{prelude::IndexedRandom, rngs::StdRng};

use crate::{
    error::{Error, Result},
    lane::{Action, LaneState, WAVE_MAX},
    opponents::OpponentPolicy,
};

fn no_legal(state: &LaneState) -> Error {
    Error::NoLegalActions {
        state: state.encode(),
    }
}

fn pick_or_first(preferred: Action, state: &LaneState, legal: &[Action]) -> Result<Action> {
    if legal.contains(&preferred) {
        Ok(preferred)
    } else {
        legal.first().copied().ok_or_else(|| no_legal(state))
    }
}

/// Shoves the wave relentlessly.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysPush;

impl OpponentPolicy for AlwaysPush {
    fn name(&self) -> &str {
        "always-push"
    }

    fn choose(&self, state: &LaneState, legal: &[Action], _rng: &mut StdRng) -> Result<Action> {
        pick_or_first(Action::Push, state, legal)
    }
}

/// Holds the freeze no matter what.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysFreeze;

impl OpponentPolicy for AlwaysFreeze {
    fn name(&self) -> &str {
        "always-freeze"
    }

    fn choose(&self, state: &LaneState, legal: &[Action], _rng: &mut StdRng) -> Result<Action> {
        pick_or_first(Action::Freeze, state, legal)
    }
}

/// Risk-averse farmer: resets when hurt, backs off when overextended,
/// otherwise quietly takes what the wave gives.
#[derive(Debug, Clone, Copy)]
pub struct SafeFarmer;

impl OpponentPolicy for SafeFarmer {
    fn name(&self) -> &str {
        "safe-farmer"
    }

    fn choose(&self, state: &LaneState, legal: &[Action], _rng: &mut StdRng) -> Result<Action> {
        if legal.contains(&Action::Recall) && state.hp_ally <= 1 {
            return Ok(Action::Recall);
        }
        if state.wave >= WAVE_MAX {
            return pick_or_first(Action::Freeze, state, legal);
        }
        pick_or_first(Action::LastHit, state, legal)
    }
}

/// Uniformly random legal action; the baseline chaos monkey.
#[derive(Debug, Clone, Copy)]
pub struct UniformRandom;

impl OpponentPolicy for UniformRandom {
    fn name(&self) -> &str {
        "uniform-random"
    }

    fn choose(&self, state: &LaneState, legal: &[Action], rng: &mut StdRng) -> Result<Action> {
        legal.choose(rng).copied().ok_or_else(|| no_legal(state))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::lane::HP_FULL;

    fn state(wave: i8, hp: u8) -> LaneState {
        LaneState {
            wave,
            stack_ally: 0,
            stack_enemy: 0,
            hp_ally: hp,
            hp_enemy: HP_FULL,
            gold: 0,
            plates_ally: 3,
            plates_enemy: 3,
            ward_ally: false,
            ward_enemy: false,
            turn: 0,
        }
    }

    #[test]
    fn scripted_policies_stay_in_character() {
        let mut rng = StdRng::seed_from_u64(0);
        let s = state(0, HP_FULL);
        let legal = s.legal_actions();

        assert_eq!(
            AlwaysPush.choose(&s, &legal, &mut rng).unwrap(),
            Action::Push
        );
        assert_eq!(
            AlwaysFreeze.choose(&s, &legal, &mut rng).unwrap(),
            Action::Freeze
        );
        assert_eq!(
            SafeFarmer.choose(&s, &legal, &mut rng).unwrap(),
            Action::LastHit
        );
    }

    #[test]
    fn safe_farmer_recalls_when_hurt() {
        let mut rng = StdRng::seed_from_u64(0);
        let hurt = state(0, 1);
        let legal = hurt.legal_actions();
        assert_eq!(
            SafeFarmer.choose(&hurt, &legal, &mut rng).unwrap(),
            Action::Recall
        );
    }

    #[test]
    fn safe_farmer_backs_off_when_overextended() {
        let mut rng = StdRng::seed_from_u64(0);
        let deep = state(WAVE_MAX, HP_FULL);
        let legal = deep.legal_actions();
        assert_eq!(
            SafeFarmer.choose(&deep, &legal, &mut rng).unwrap(),
            Action::Freeze
        );
    }

    #[test]
    fn uniform_random_only_picks_legal_actions() {
        let mut rng = StdRng::seed_from_u64(42);
        let s = state(0, HP_FULL);
        let legal = s.legal_actions();
        for _ in 0..100 {
            let action = UniformRandom.choose(&s, &legal, &mut rng).unwrap();
            assert!(legal.contains(&action));
            assert_ne!(action, Action::Recall);
        }
    }
}
