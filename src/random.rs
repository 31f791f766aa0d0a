//! Randomness helpers.
//!
//! Nothing in the crate draws from ambient randomness: every sampling site
//! takes an explicit `Rng`, so a seeded generator reproduces a search exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Gamma};

use crate::mcts::SearchError;

const DEFAULT_SEED: u64 = 3819201;

/// The generator used throughout the tests and demos.
pub type SeededRng = ChaCha20Rng;

/// Creates a deterministic generator from `seed`.
pub fn seeded(seed: u64) -> SeededRng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Creates a deterministic generator with the library's default seed.
pub fn default_seeded() -> SeededRng {
    seeded(DEFAULT_SEED)
}

/// Draws an index with probability proportional to `weights`.
///
/// Returns `None` when no weight is positive.
pub fn sample_index<R: Rng + ?Sized>(weights: &[f64], random: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let target = random.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        if target < cumulative {
            return Some(i);
        }
    }

    // rounding can leave target just above the final sum
    weights.iter().rposition(|w| *w > 0.0)
}

/// Samples `Dirichlet(alpha, ..., alpha)` of dimension `n` through normalized
/// Gamma variates.
pub fn dirichlet_noise<R: Rng + ?Sized>(
    n: usize,
    alpha: f64,
    random: &mut R,
) -> Result<Vec<f64>, SearchError> {
    let gamma = Gamma::new(alpha, 1.0)
        .map_err(|e| SearchError::InvalidParameter(format!("dirichlet alpha {alpha}: {e}")))?;
    let mut samples: Vec<f64> = (0..n).map(|_| gamma.sample(random)).collect();

    let sum: f64 = samples.iter().sum();
    if sum > 0.0 {
        for s in &mut samples {
            *s /= sum;
        }
    } else if n > 0 {
        samples.fill(1.0 / n as f64);
    }
    Ok(samples)
}

/// Mixes `probabilities` with Dirichlet noise: `(1 - weight) * p + weight * noise`.
pub fn mix_with_noise<R: Rng + ?Sized>(
    probabilities: &[f64],
    alpha: f64,
    weight: f64,
    random: &mut R,
) -> Result<Vec<f64>, SearchError> {
    let noise = dirichlet_noise(probabilities.len(), alpha, random)?;
    Ok(probabilities
        .iter()
        .zip(noise)
        .map(|(p, n)| (1.0 - weight) * p + weight * n)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_generators_repeat() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        let xs: Vec<u64> = (0..5).map(|_| a.random()).collect();
        let ys: Vec<u64> = (0..5).map(|_| b.random()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn sample_index_never_picks_zero_weight() {
        let mut random = seeded(42);
        let weights = [0.0, 0.5, 0.3, 0.2, 0.0];

        let mut counts = [0u32; 5];
        for _ in 0..1000 {
            counts[sample_index(&weights, &mut random).unwrap()] += 1;
        }

        assert_eq!(counts[0], 0);
        assert_eq!(counts[4], 0);
        assert!(counts[1] > counts[2]);
        assert!(counts[2] > counts[3]);
    }

    #[test]
    fn sample_index_without_mass_is_none() {
        let mut random = default_seeded();
        assert_eq!(sample_index(&[0.0, 0.0], &mut random), None);
        assert_eq!(sample_index(&[], &mut random), None);
    }

    #[test]
    fn dirichlet_noise_is_a_distribution() {
        let mut random = seeded(3);
        let noise = dirichlet_noise(7, 0.3, &mut random).unwrap();
        assert_eq!(noise.len(), 7);
        assert!(noise.iter().all(|&x| x >= 0.0));
        assert!((noise.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn dirichlet_rejects_non_positive_alpha() {
        let mut random = seeded(3);
        let result = dirichlet_noise(3, 0.0, &mut random);
        assert!(matches!(result, Err(SearchError::InvalidParameter(_))));
    }

    #[test]
    fn mixing_keeps_total_mass() {
        let mut random = seeded(11);
        let mixed = mix_with_noise(&[0.7, 0.2, 0.1], 0.3, 0.25, &mut random).unwrap();
        assert!((mixed.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(mixed.iter().all(|&p| p >= 0.0));
        assert!(mixed[0] >= 0.75 * 0.7);
    }
}
