//! Uniform sampling of contribution vectors on the probability simplex.
//!
//! Weights are drawn from Dirichlet(1, ..., 1) by normalizing independent
//! Exp(1) variates. This is exactly uniform over the simplex; normalizing
//! uniform variates instead would pull draws toward the centroid.
//!
//! Each trial owns an RNG seeded from `(base seed, trial index)`, so the
//! draws a trial sees never depend on which worker runs it or in what order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution as Sampler, Exp1};

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 finalizer.
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Sub-seed for one trial, derived from the run seed and the trial index.
pub fn trial_seed(base_seed: u64, index: u64) -> u64 {
    splitmix64(base_seed ^ index.wrapping_mul(GOLDEN_GAMMA))
}

/// Independent RNG for one trial.
pub fn trial_rng(base_seed: u64, index: u64) -> StdRng {
    StdRng::seed_from_u64(trial_seed(base_seed, index))
}

/// A fresh run seed from OS entropy, for unseeded (non-reproducible) runs.
pub fn entropy_seed() -> u64 {
    rand::thread_rng().gen()
}

/// Draw one point uniformly from the simplex of dimension `n`.
pub fn sample_simplex<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<f64> {
    let mut weights: Vec<f64> = (0..n).map(|_| Exp1.sample(rng)).collect();
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        weights.iter_mut().for_each(|w| *w /= total);
    } else {
        // Every draw underflowed to zero; fall back to the centroid.
        weights.iter_mut().for_each(|w| *w = 1.0 / n as f64);
    }
    weights
}
