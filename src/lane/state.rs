//! Bucketed lane state

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    lane::{
        action::{ACTIONS, Action},
        env::LaneParams,
    },
};

/// Wave position buckets run from `-WAVE_MAX` (crashing into own tower) to
/// `+WAVE_MAX` (crashing into the enemy tower).
pub const WAVE_MAX: i8 = 2;

/// Minion stack tiers per player: 0 (no stack) to `STACK_MAX` (big wave).
pub const STACK_MAX: u8 = 2;

/// Health tiers per player: 0 (critical) to `HP_FULL` (full).
pub const HP_FULL: u8 = 2;

/// A discretized snapshot of the lane, expressed from one player's
/// perspective ("ally" is the observing player).
///
/// Every field is bucketed into a small finite range, so the cross-product
/// of all dimensions is the entire reachable state space and a state value
/// is directly usable as a lookup key. Two states with identical bucket
/// values are the same state; no continuous information rides along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaneState {
    /// Wave position bucket, positive = pushed toward the enemy tower.
    pub wave: i8,
    /// Own minion stack tier.
    pub stack_ally: u8,
    /// Enemy minion stack tier.
    pub stack_enemy: u8,
    /// Own health tier.
    pub hp_ally: u8,
    /// Enemy health tier.
    pub hp_enemy: u8,
    /// Farm/gold lead tier, ally minus enemy, clamped to the configured cap.
    pub gold: i8,
    /// Plates remaining on the ally outer turret.
    pub plates_ally: u8,
    /// Plates remaining on the enemy outer turret.
    pub plates_enemy: u8,
    /// Jungle vision this step; suppresses gank risk for the ally.
    pub ward_ally: bool,
    /// Jungle vision for the enemy.
    pub ward_enemy: bool,
    /// Time-step index within the bounded episode horizon.
    pub turn: u8,
}

impl LaneState {
    /// The same global lane position seen from the other player's side.
    ///
    /// Mirroring negates the shared signed buckets and swaps the per-player
    /// pairs; applying it twice returns the original state.
    pub fn mirrored(self) -> Self {
        Self {
            wave: -self.wave,
            stack_ally: self.stack_enemy,
            stack_enemy: self.stack_ally,
            hp_ally: self.hp_enemy,
            hp_enemy: self.hp_ally,
            gold: -self.gold,
            plates_ally: self.plates_enemy,
            plates_enemy: self.plates_ally,
            ward_ally: self.ward_enemy,
            ward_enemy: self.ward_ally,
            turn: self.turn,
        }
    }

    /// Whether `action` is legal for the observing player in this state.
    ///
    /// `Recall` requires missing health; everything else is always legal.
    pub fn is_action_legal(&self, action: Action) -> bool {
        match action {
            Action::Recall => self.hp_ally < HP_FULL,
            _ => true,
        }
    }

    /// Legal actions for the observing player, in canonical index order.
    pub fn legal_actions(&self) -> Vec<Action> {
        ACTIONS
            .iter()
            .copied()
            .filter(|a| self.is_action_legal(*a))
            .collect()
    }

    /// Stable textual key for persistence, colon-separated bucket values.
    pub fn encode(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}:{}:{}:{}:{}:{}",
            self.wave,
            self.stack_ally,
            self.stack_enemy,
            self.hp_ally,
            self.hp_enemy,
            self.gold,
            self.plates_ally,
            self.plates_enemy,
            u8::from(self.ward_ally),
            u8::from(self.ward_enemy),
            self.turn,
        )
    }

    /// Parse a key produced by [`LaneState::encode`].
    pub fn decode(key: &str) -> Result<Self> {
        let invalid = |detail: &str| Error::InvalidStateKey {
            key: key.to_string(),
            detail: detail.to_string(),
        };

        let fields: Vec<&str> = key.split(':').collect();
        if fields.len() != 11 {
            return Err(invalid(&format!("expected 11 fields, got {}", fields.len())));
        }

        let int = |idx: usize, name: &str| -> Result<i8> {
            fields[idx]
                .parse::<i8>()
                .map_err(|_| invalid(&format!("field '{name}' is not an integer")))
        };
        let tier = |idx: usize, name: &str| -> Result<u8> {
            fields[idx]
                .parse::<u8>()
                .map_err(|_| invalid(&format!("field '{name}' is not a tier")))
        };
        let flag = |idx: usize, name: &str| -> Result<bool> {
            match fields[idx] {
                "0" => Ok(false),
                "1" => Ok(true),
                _ => Err(invalid(&format!("field '{name}' is not a 0/1 flag"))),
            }
        };

        Ok(Self {
            wave: int(0, "wave")?,
            stack_ally: tier(1, "stack_ally")?,
            stack_enemy: tier(2, "stack_enemy")?,
            hp_ally: tier(3, "hp_ally")?,
            hp_enemy: tier(4, "hp_enemy")?,
            gold: int(5, "gold")?,
            plates_ally: tier(6, "plates_ally")?,
            plates_enemy: tier(7, "plates_enemy")?,
            ward_ally: flag(8, "ward_ally")?,
            ward_enemy: flag(9, "ward_enemy")?,
            turn: tier(10, "turn")?,
        })
    }

    /// Check every bucket against its declared range.
    ///
    /// A violation means the transition function produced a state outside
    /// the model's domain; callers treat it as fatal to the training run.
    pub fn validate(&self, params: &LaneParams) -> Result<()> {
        let fail = |detail: String| Error::StateSpaceViolation {
            state: self.encode(),
            detail,
        };

        if self.wave < -WAVE_MAX || self.wave > WAVE_MAX {
            return Err(fail(format!("wave {} outside [-{WAVE_MAX}, {WAVE_MAX}]", self.wave)));
        }
        if self.stack_ally > STACK_MAX || self.stack_enemy > STACK_MAX {
            return Err(fail(format!(
                "stacks ({}, {}) exceed {STACK_MAX}",
                self.stack_ally, self.stack_enemy
            )));
        }
        if self.hp_ally > HP_FULL || self.hp_enemy > HP_FULL {
            return Err(fail(format!(
                "health tiers ({}, {}) exceed {HP_FULL}",
                self.hp_ally, self.hp_enemy
            )));
        }
        if self.gold < -params.gold_cap || self.gold > params.gold_cap {
            return Err(fail(format!(
                "gold lead {} outside [-{1}, {1}]",
                self.gold, params.gold_cap
            )));
        }
        if self.plates_ally > params.plates || self.plates_enemy > params.plates {
            return Err(fail(format!(
                "plates ({}, {}) exceed {}",
                self.plates_ally, self.plates_enemy, params.plates
            )));
        }
        if self.turn > params.max_steps {
            return Err(fail(format!(
                "turn {} past horizon {}",
                self.turn, params.max_steps
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn even_lane() -> LaneState {
        LaneState {
            wave: 0,
            stack_ally: 0,
            stack_enemy: 0,
            hp_ally: HP_FULL,
            hp_enemy: HP_FULL,
            gold: 0,
            plates_ally: 3,
            plates_enemy: 3,
            ward_ally: true,
            ward_enemy: false,
            turn: 0,
        }
    }

    #[test]
    fn mirroring_is_an_involution() {
        let state = LaneState {
            wave: -1,
            stack_ally: 2,
            stack_enemy: 0,
            hp_ally: 1,
            hp_enemy: 2,
            gold: 2,
            plates_ally: 1,
            plates_enemy: 3,
            ward_ally: false,
            ward_enemy: true,
            turn: 7,
        };
        assert_eq!(state.mirrored().mirrored(), state);
    }

    #[test]
    fn mirroring_swaps_perspective() {
        let state = even_lane();
        let mirror = state.mirrored();
        assert_eq!(mirror.wave, -state.wave);
        assert_eq!(mirror.gold, -state.gold);
        assert_eq!(mirror.ward_ally, state.ward_enemy);
        assert_eq!(mirror.plates_ally, state.plates_enemy);
        assert_eq!(mirror.turn, state.turn);
    }

    #[test]
    fn recall_requires_missing_health() {
        let full = even_lane();
        assert!(!full.is_action_legal(Action::Recall));
        assert_eq!(full.legal_actions().len(), 4);

        let hurt = LaneState { hp_ally: 1, ..full };
        assert!(hurt.is_action_legal(Action::Recall));
        assert_eq!(hurt.legal_actions().len(), 5);
    }

    #[test]
    fn legal_actions_in_canonical_order() {
        let hurt = LaneState {
            hp_ally: 0,
            ..even_lane()
        };
        let legal = hurt.legal_actions();
        let indices: Vec<usize> = legal.iter().map(|a| a.index()).collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(indices, sorted);
    }

    #[test]
    fn encode_decode_round_trips() {
        let state = LaneState {
            wave: -2,
            stack_ally: 1,
            stack_enemy: 2,
            hp_ally: 0,
            hp_enemy: 2,
            gold: -3,
            plates_ally: 0,
            plates_enemy: 2,
            ward_ally: true,
            ward_enemy: false,
            turn: 39,
        };
        let decoded = LaneState::decode(&state.encode()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn decode_rejects_malformed_keys() {
        assert!(matches!(
            LaneState::decode("1:2:3"),
            Err(Error::InvalidStateKey { .. })
        ));
        assert!(matches!(
            LaneState::decode("x:0:0:2:2:0:3:3:1:0:0"),
            Err(Error::InvalidStateKey { .. })
        ));
        assert!(matches!(
            LaneState::decode("0:0:0:2:2:0:3:3:2:0:0"),
            Err(Error::InvalidStateKey { .. })
        ));
    }

    #[test]
    fn validate_flags_out_of_range_buckets() {
        let params = LaneParams::default();
        assert!(even_lane().validate(&params).is_ok());

        let bad_wave = LaneState {
            wave: 3,
            ..even_lane()
        };
        assert!(matches!(
            bad_wave.validate(&params),
            Err(Error::StateSpaceViolation { .. })
        ));

        let bad_plates = LaneState {
            plates_enemy: params.plates + 1,
            ..even_lane()
        };
        assert!(matches!(
            bad_plates.validate(&params),
            Err(Error::StateSpaceViolation { .. })
        ));
    }
}
