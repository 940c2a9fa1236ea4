//! Weighted opponent pool with a fixed-capacity snapshot ring

use rand::{SeedableRng, rngs::StdRng};

use crate::{
    error::{Error, Result},
    opponents::{FrozenPolicy, OpponentPolicy, PolicyKind},
    utils::weighted_sample,
};

/// One registered opponent.
pub struct PoolEntry {
    /// Identifier used in reports and for deduplication.
    pub id: String,
    /// Scripted heuristic or frozen snapshot.
    pub kind: PolicyKind,
    /// Relative sampling weight.
    pub weight: f64,
    /// The policy itself.
    pub policy: Box<dyn OpponentPolicy>,
}

/// Weighted collection of candidate opponents, sampled once per episode.
///
/// Scripted entries are permanent; snapshot entries live in a
/// fixed-capacity ring where the oldest snapshot is dropped first. That
/// bounds memory and keeps the pool diverse instead of dominated by
/// near-duplicate recent snapshots.
pub struct OpponentPool {
    entries: Vec<PoolEntry>,
    snapshot_capacity: usize,
    rng: StdRng,
}

impl OpponentPool {
    /// Create an empty pool holding at most `snapshot_capacity` snapshots.
    pub fn new(snapshot_capacity: usize) -> Result<Self> {
        if snapshot_capacity == 0 {
            return Err(Error::InvalidConfiguration {
                message: "opponent_pool_capacity must be at least 1".to_string(),
            });
        }
        Ok(Self {
            entries: Vec::new(),
            snapshot_capacity,
            rng: StdRng::from_rng(&mut rand::rng()),
        })
    }

    /// Fix the sampling seed for reproducible opponent draws.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.reseed(seed);
        self
    }

    /// Reseed the sampling RNG in place.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Register a scripted policy with a relative sampling weight.
    pub fn add(
        &mut self,
        id: impl Into<String>,
        policy: Box<dyn OpponentPolicy>,
        weight: f64,
    ) -> Result<()> {
        self.insert(id.into(), PolicyKind::Scripted, policy, weight)
    }

    /// Register a frozen snapshot, evicting the oldest snapshot first when
    /// the ring is full. Scripted entries are never evicted.
    pub fn push_snapshot(
        &mut self,
        id: impl Into<String>,
        policy: FrozenPolicy,
        weight: f64,
    ) -> Result<()> {
        if self.snapshot_count() >= self.snapshot_capacity
            && let Some(oldest) = self
                .entries
                .iter()
                .position(|e| e.kind == PolicyKind::Snapshot)
        {
            self.entries.remove(oldest);
        }
        self.insert(id.into(), PolicyKind::Snapshot, Box::new(policy), weight)
    }

    fn insert(
        &mut self,
        id: String,
        kind: PolicyKind,
        policy: Box<dyn OpponentPolicy>,
        weight: f64,
    ) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidConfiguration {
                message: format!("sampling weight for '{id}' must be finite and non-negative"),
            });
        }
        if self.entries.iter().any(|e| e.id == id) {
            return Err(Error::InvalidConfiguration {
                message: format!("duplicate opponent id '{id}'"),
            });
        }
        self.entries.push(PoolEntry {
            id,
            kind,
            weight,
            policy,
        });
        Ok(())
    }

    /// Draw one entry index by weighted random selection.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyOpponentPool`] before any policy is registered;
    /// training fails fast rather than defaulting to a null opponent.
    pub fn sample(&mut self) -> Result<usize> {
        if self.entries.is_empty() {
            return Err(Error::EmptyOpponentPool);
        }
        let weighted: Vec<(usize, f64)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, e.weight))
            .collect();
        weighted_sample(&mut self.rng, &weighted).ok_or(Error::EmptyOpponentPool)
    }

    /// All registered entries, oldest first.
    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    /// Entry at a previously sampled index.
    pub fn entry(&self, index: usize) -> Option<&PoolEntry> {
        self.entries.get(index)
    }

    /// Total number of registered policies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool has no policies yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of snapshot entries currently held.
    pub fn snapshot_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind == PolicyKind::Snapshot)
            .count()
    }
}
