//! Small sampling utilities shared by the environment, pool, and tests

use rand::{Rng, prelude::IndexedRandom};

/// Draw from a Bernoulli distribution with success probability `p`.
///
/// Probabilities outside `[0, 1]` saturate: `p <= 0` never fires and
/// `p >= 1` always fires.
pub fn bernoulli<R: Rng>(rng: &mut R, p: f64) -> bool {
    rng.random::<f64>() < p
}

/// Weighted random selection from `(item, weight)` pairs.
///
/// Standard threshold walk: draw in `[0, total)`, subtract weights until the
/// threshold crosses zero. Zero or negative total weight falls back to a
/// uniform pick; the last item backstops floating-point drift.
///
/// # Examples
///
/// ```
/// use rand::{SeedableRng, rngs::StdRng};
/// use laneq::utils::weighted_sample;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let items = vec![("a", 1.0), ("b", 2.0)];
/// assert!(weighted_sample(&mut rng, &items).is_some());
/// ```
pub fn weighted_sample<R, T>(rng: &mut R, items: &[(T, f64)]) -> Option<T>
where
    R: Rng,
    T: Clone,
{
    if items.is_empty() {
        return None;
    }

    let total: f64 = items.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return items.choose(rng).map(|(item, _)| item.clone());
    }

    let mut threshold = rng.random::<f64>() * total;
    for (item, weight) in items {
        if threshold < *weight {
            return Some(item.clone());
        }
        threshold -= weight;
    }

    items.last().map(|(item, _)| item.clone())
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn weighted_sample_empty_returns_none() {
        let mut rng = StdRng::seed_from_u64(42);
        let items: Vec<(u32, f64)> = vec![];
        assert_eq!(weighted_sample(&mut rng, &items), None);
    }

    #[test]
    fn weighted_sample_single_item() {
        let mut rng = StdRng::seed_from_u64(42);
        let items = vec![("only", 1.0)];
        assert_eq!(weighted_sample(&mut rng, &items), Some("only"));
    }

    #[test]
    fn weighted_sample_zero_weights_falls_back_to_uniform() {
        let mut rng = StdRng::seed_from_u64(42);
        let items = vec![("a", 0.0), ("b", 0.0)];
        assert!(weighted_sample(&mut rng, &items).is_some());
    }

    #[test]
    fn weighted_sample_respects_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let items = vec![("light", 1.0), ("heavy", 4.0)];

        let mut heavy = 0;
        for _ in 0..1000 {
            if weighted_sample(&mut rng, &items) == Some("heavy") {
                heavy += 1;
            }
        }
        assert!(heavy > 650, "heavy item should dominate, got {heavy}/1000");
    }

    #[test]
    fn weighted_sample_deterministic_under_seed() {
        let items = vec![("a", 1.0), ("b", 2.0), ("c", 1.0)];

        let mut rng1 = StdRng::seed_from_u64(12345);
        let mut rng2 = StdRng::seed_from_u64(12345);
        assert_eq!(
            weighted_sample(&mut rng1, &items),
            weighted_sample(&mut rng2, &items)
        );
    }

    #[test]
    fn bernoulli_saturates() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(!bernoulli(&mut rng, 0.0));
        assert!(bernoulli(&mut rng, 1.0));
    }
}
