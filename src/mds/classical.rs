//! Starting configurations for SMACOF.
//!
//! Classical (Torgerson) scaling double-centres the squared dissimilarities
//! and keeps the leading eigenvectors, each scaled by `sqrt(max(λ, 0))`. For
//! Euclidean-embeddable dissimilarities this is already the optimum.

use nalgebra::{DMatrix, SymmetricEigen};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Classical scaling of an N×N dissimilarity matrix into `dims` dimensions.
pub fn classical_scaling(delta: &DMatrix<f64>, dims: usize) -> DMatrix<f64> {
    let n = delta.nrows();
    let sq = delta.map(|d| d * d);

    let row_means: Vec<f64> = (0..n).map(|i| sq.row(i).sum() / n as f64).collect();
    let grand_mean = row_means.iter().sum::<f64>() / n as f64;
    let gram = DMatrix::from_fn(n, n, |i, j| {
        -0.5 * (sq[(i, j)] - row_means[i] - row_means[j] + grand_mean)
    });

    let eigen = SymmetricEigen::new(gram);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let mut coords = DMatrix::zeros(n, dims);
    for (k, &idx) in order.iter().take(dims).enumerate() {
        let scale = eigen.eigenvalues[idx].max(0.0).sqrt();
        for i in 0..n {
            coords[(i, k)] = eigen.eigenvectors[(i, idx)] * scale;
        }
    }
    coords
}

/// Seeded uniform start in `[-scale, scale]` per coordinate.
pub fn random_configuration(n: usize, dims: usize, scale: f64, seed: u64) -> DMatrix<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let scale = if scale > 0.0 { scale } else { 1.0 };
    DMatrix::from_fn(n, dims, |_, _| rng.gen_range(-scale..=scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pairwise(x: &DMatrix<f64>, i: usize, j: usize) -> f64 {
        (x.row(i) - x.row(j)).norm()
    }

    #[test]
    fn test_recovers_line() {
        // Points at 0, 1, 3 on a line.
        let pos: [f64; 3] = [0.0, 1.0, 3.0];
        let delta = DMatrix::from_fn(3, 3, |i, j| (pos[i] - pos[j]).abs());
        let x = classical_scaling(&delta, 2);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(pairwise(&x, i, j), delta[(i, j)], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_equilateral() {
        let delta = DMatrix::from_fn(3, 3, |i, j| if i == j { 0.0 } else { 1.0 });
        let x = classical_scaling(&delta, 2);
        assert_relative_eq!(pairwise(&x, 0, 1), 1.0, epsilon = 1e-9);
        assert_relative_eq!(pairwise(&x, 1, 2), 1.0, epsilon = 1e-9);
        assert_relative_eq!(pairwise(&x, 0, 2), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_matrix_collapses_to_origin() {
        let x = classical_scaling(&DMatrix::zeros(4, 4), 2);
        assert!(x.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_random_configuration_seeded() {
        let a = random_configuration(5, 2, 0.5, 9);
        let b = random_configuration(5, 2, 0.5, 9);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| v.abs() <= 0.5));
    }
}
