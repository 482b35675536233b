//! SMACOF stress majorization.
//!
//! Each iteration applies the Guttman transform `X ← B(X)·X / n`, where
//! `B_ij = -δ_ij / d_ij` for `i ≠ j` (zero when `d_ij` vanishes) and
//! `B_ii = -Σ_j B_ij`. Raw stress never increases from one iteration to the
//! next, so the loop cannot oscillate.

use nalgebra::DMatrix;

/// Pairwise embedding distances below this are treated as coincident points.
const COINCIDENT: f64 = 1e-12;

/// Normalized stress below which the fit is treated as exact.
const EXACT_FIT: f64 = 1e-16;

/// Final state of a SMACOF run.
#[derive(Debug, Clone)]
pub struct SmacofOutcome {
    /// N×dims coordinates.
    pub coordinates: DMatrix<f64>,
    /// `Σ_{i<j} (δ_ij - d_ij)²`.
    pub raw_stress: f64,
    /// Guttman transforms applied.
    pub iterations: usize,
    /// True when the run stopped before `max_iterations`: an exact fit, a
    /// relative improvement below `tolerance`, or a step that failed to lower
    /// stress at all (a rounding stall, discarded and counted as no improvement).
    pub converged: bool,
}

/// Euclidean distance between rows `i` and `j`.
fn row_distance(x: &DMatrix<f64>, i: usize, j: usize) -> f64 {
    (x.row(i) - x.row(j)).norm()
}

/// Raw stress of configuration `x` against dissimilarities `delta`.
pub fn raw_stress(delta: &DMatrix<f64>, x: &DMatrix<f64>) -> f64 {
    let n = delta.nrows();
    let mut stress = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let diff = delta[(i, j)] - row_distance(x, i, j);
            stress += diff * diff;
        }
    }
    stress
}

fn guttman_transform(delta: &DMatrix<f64>, x: &DMatrix<f64>) -> DMatrix<f64> {
    let n = delta.nrows();
    let mut b = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = row_distance(x, i, j);
            if d > COINCIDENT {
                let v = -delta[(i, j)] / d;
                b[(i, j)] = v;
                b[(j, i)] = v;
            }
        }
    }
    for i in 0..n {
        let off_diagonal: f64 = (0..n).filter(|&j| j != i).map(|j| b[(i, j)]).sum();
        b[(i, i)] = -off_diagonal;
    }
    (&b * x) / n as f64
}

/// Run SMACOF from `init` until the relative stress improvement drops below
/// `tolerance`, the fit is exact, or `max_iterations` transforms were applied.
pub fn smacof(
    delta: &DMatrix<f64>,
    init: DMatrix<f64>,
    max_iterations: usize,
    tolerance: f64,
) -> SmacofOutcome {
    let norm: f64 = {
        let n = delta.nrows();
        (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| delta[(i, j)].powi(2))
            .sum()
    };
    if norm == 0.0 {
        return SmacofOutcome {
            coordinates: DMatrix::zeros(init.nrows(), init.ncols()),
            raw_stress: 0.0,
            iterations: 0,
            converged: true,
        };
    }

    let mut x = init;
    let mut stress = raw_stress(delta, &x);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        if stress / norm < EXACT_FIT {
            converged = true;
            break;
        }
        let next = guttman_transform(delta, &x);
        let next_stress = raw_stress(delta, &next);
        iterations += 1;

        if next_stress > stress {
            // Only rounding can raise stress: no improvement, keep the better configuration.
            converged = true;
            break;
        }
        let improvement = (stress - next_stress) / stress;
        x = next;
        stress = next_stress;
        if improvement < tolerance {
            converged = true;
            break;
        }
    }
    if !converged && stress / norm < EXACT_FIT {
        converged = true;
    }

    SmacofOutcome {
        coordinates: x,
        raw_stress: stress,
        iterations,
        converged,
    }
}
