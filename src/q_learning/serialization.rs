//! Persistence for trained policies
//!
//! Two formats with different jobs:
//!
//! - [`SavedAgent`]: versioned binary snapshot of a whole agent (table,
//!   hyperparameters, exploration state), for resuming or archiving runs.
//! - [`PolicyExport`]: the portable contract, a deterministic JSON
//!   mapping from `"{state}|{action}"` keys to Q-values, reloadable for
//!   evaluation or for seeding a later run's opponent pool.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::{
    lane::{Action, LaneState},
    q_learning::{agent::QLearningAgent, q_table::QTable},
};

/// Versioned full-agent snapshot, serialized as MessagePack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAgent {
    pub version: u32,
    table: QTable,
    epsilon: f64,
    rng_seed: Option<u64>,
}

impl SavedAgent {
    pub const VERSION: u32 = 1;

    /// Capture the agent's current state.
    pub fn from_agent(agent: &QLearningAgent) -> Self {
        Self {
            version: Self::VERSION,
            table: agent.q_table().clone(),
            epsilon: agent.epsilon(),
            rng_seed: agent.rng_seed(),
        }
    }

    /// Reconstruct a live agent from the snapshot.
    pub fn into_agent(self) -> Result<QLearningAgent> {
        if self.version != Self::VERSION {
            return Err(anyhow!(
                "unsupported agent save format version {}, expected {}",
                self.version,
                Self::VERSION
            ));
        }
        Ok(QLearningAgent::from_parts(
            self.table,
            self.epsilon,
            self.rng_seed,
        ))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("failed to create file: {}", path.as_ref().display()))?;
        let mut writer = BufWriter::new(file);
        rmp_serde::encode::write(&mut writer, self).context("failed to serialize agent")?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("failed to open file: {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);
        rmp_serde::decode::from_read(reader).context("failed to deserialize agent")
    }
}

/// Portable value-table export with stable, deterministic keys.
///
/// Keys are `"{state.encode()}|{action.id()}"`; `BTreeMap` fixes the
/// serialized order, so exporting the same table twice yields identical
/// bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyExport {
    pub version: u32,
    entries: BTreeMap<String, f64>,
}

impl PolicyExport {
    pub const VERSION: u32 = 1;

    /// Export every stored (state, action) value.
    pub fn from_q_table(table: &QTable) -> Self {
        let entries = table
            .entries()
            .map(|((state, action), value)| {
                (format!("{}|{}", state.encode(), action.id()), *value)
            })
            .collect();
        Self {
            version: Self::VERSION,
            entries,
        }
    }

    /// Rebuild a Q-table from the export under the given hyperparameters.
    pub fn into_q_table(
        self,
        learning_rate: f64,
        discount_factor: f64,
        q_init: f64,
    ) -> Result<QTable> {
        if self.version != Self::VERSION {
            return Err(anyhow!(
                "unsupported policy export version {}, expected {}",
                self.version,
                Self::VERSION
            ));
        }
        let mut table = QTable::new(learning_rate, discount_factor, q_init)?;
        for (key, value) in self.entries {
            let (state_key, action_id) = key
                .rsplit_once('|')
                .ok_or_else(|| anyhow!("policy key '{key}' is missing the action separator"))?;
            let state = LaneState::decode(state_key)?;
            let action = Action::from_id(action_id)?;
            table.set(state, action, value);
        }
        Ok(table)
    }

    /// Number of exported entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the export is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("failed to create file: {}", path.as_ref().display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).context("failed to serialize policy export")?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("failed to open file: {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).context("failed to deserialize policy export")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lane::{ACTIONS, HP_FULL};

    fn state(wave: i8) -> LaneState {
        LaneState {
            wave,
            stack_ally: 0,
            stack_enemy: 0,
            hp_ally: HP_FULL,
            hp_enemy: HP_FULL,
            gold: 0,
            plates_ally: 3,
            plates_enemy: 3,
            ward_ally: false,
            ward_enemy: true,
            turn: 4,
        }
    }

    #[test]
    fn saved_agent_round_trips_in_memory() -> Result<()> {
        let mut agent = QLearningAgent::new(0.3, 0.9, 0.0)?.with_seed(5);
        agent.set_epsilon(0.2);
        agent.update(&state(0), Action::Push, 1.0, &state(1), &ACTIONS, false);

        let saved = SavedAgent::from_agent(&agent);
        let bytes = rmp_serde::to_vec(&saved)?;
        let loaded: SavedAgent = rmp_serde::from_slice(&bytes)?;
        let restored = loaded.into_agent()?;

        assert_eq!(restored.q_table().len(), agent.q_table().len());
        assert_eq!(restored.epsilon(), 0.2);
        assert_eq!(
            restored.q_table().get(&state(0), Action::Push),
            agent.q_table().get(&state(0), Action::Push)
        );
        Ok(())
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut saved = SavedAgent::from_agent(&QLearningAgent::new(0.3, 0.9, 0.0).unwrap());
        saved.version = 99;
        assert!(saved.into_agent().is_err());
    }

    #[test]
    fn policy_export_round_trips() -> Result<()> {
        let mut table = QTable::new(0.3, 0.9, 0.0)?;
        table.set(state(-1), Action::Freeze, -0.25);
        table.set(state(2), Action::Shove, 1.5);

        let export = PolicyExport::from_q_table(&table);
        assert_eq!(export.len(), 2);

        let rebuilt = export.into_q_table(0.3, 0.9, 0.0)?;
        assert_eq!(rebuilt.get(&state(-1), Action::Freeze), -0.25);
        assert_eq!(rebuilt.get(&state(2), Action::Shove), 1.5);
        assert_eq!(rebuilt.len(), 2);
        Ok(())
    }

    #[test]
    fn export_is_deterministic() -> Result<()> {
        let mut table = QTable::new(0.3, 0.9, 0.0)?;
        table.set(state(1), Action::Push, 0.5);
        table.set(state(-2), Action::LastHit, 0.1);

        let a = serde_json::to_string(&PolicyExport::from_q_table(&table))?;
        let b = serde_json::to_string(&PolicyExport::from_q_table(&table))?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn corrupt_keys_fail_to_import() {
        let mut export = PolicyExport::from_q_table(&QTable::new(0.3, 0.9, 0.0).unwrap());
        export.entries.insert("not-a-state|push".into(), 1.0);
        assert!(export.into_q_table(0.3, 0.9, 0.0).is_err());
    }
}
