//! Closed-form Local-and-Global-Consistency propagation.
//!
//! With `β_f = μ / (μ + 1)` and `α_f = 1 − β_f`, the iteration
//! `F ← α_f·S·F + β_f·Y` has the fixed point
//!
//! ```text
//! (I − α_f·S) · F = β_f · Y,     S = D^(−1/2) · W · D^(−1/2)
//! ```
//!
//! which is solved once by LU decomposition with partial pivoting. `F` is
//! not row-normalized.

use crate::error::{LgcError, Result};
use crate::params::propagation_weights;
use log::debug;
use nalgebra::{DMatrix, DVector};

/// Smallest accepted `|U[i,i]|` relative to the largest pivot.
const PIVOT_REL_EPS: f64 = 1e-12;

/// Row sums of `W` (the diagonal of `D`).
pub fn degrees(w: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(w.nrows(), w.row_iter().map(|row| row.sum()))
}

/// `S = D^(−1/2) · W · D^(−1/2)`. Every region needs positive degree.
pub fn normalize_affinity(w: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    if !w.is_square() {
        return Err(LgcError::shape(format!(
            "affinity must be square, got {}x{}",
            w.nrows(),
            w.ncols()
        )));
    }
    let d = degrees(w);
    if let Some((region, &degree)) = d
        .iter()
        .enumerate()
        .find(|&(_, &deg)| !(deg.is_finite() && deg > 0.0))
    {
        return Err(LgcError::DegenerateGraph { region, degree });
    }
    let inv_sqrt = d.map(|v| 1.0 / v.sqrt());
    Ok(DMatrix::from_fn(w.nrows(), w.ncols(), |i, j| {
        w[(i, j)] * inv_sqrt[i] * inv_sqrt[j]
    }))
}

/// Solve `(I − α_f·S)·F = β_f·Y` for an already normalized `S`.
pub fn solve_normalized(s: &DMatrix<f64>, y: &DMatrix<f64>, mu: f64) -> Result<DMatrix<f64>> {
    if !(mu.is_finite() && mu > 0.0) {
        return Err(LgcError::config(format!("mu must be positive, got {mu}")));
    }
    let n = s.nrows();
    if !s.is_square() || y.nrows() != n {
        return Err(LgcError::shape(format!(
            "propagation system mismatch: S is {}x{}, Y is {}x{}",
            s.nrows(),
            s.ncols(),
            y.nrows(),
            y.ncols()
        )));
    }
    if n == 0 {
        return Ok(DMatrix::zeros(0, y.ncols()));
    }
    let (beta_f, alpha_f) = propagation_weights(mu);
    let system = DMatrix::<f64>::identity(n, n) - s * alpha_f;
    let lu = system.lu();

    let pivots = lu.u().diagonal().map(f64::abs);
    let (p_min, p_max) = (pivots.min(), pivots.max());
    if !(p_max > 0.0 && p_min > PIVOT_REL_EPS * p_max) {
        return Err(LgcError::numeric(format!(
            "propagation system is near-singular (pivot range {p_min:e}..{p_max:e})"
        )));
    }

    let rhs = y * beta_f;
    let f = lu
        .solve(&rhs)
        .ok_or_else(|| LgcError::numeric("propagation system is singular"))?;
    if f.iter().any(|v| !v.is_finite()) {
        return Err(LgcError::numeric("propagation produced non-finite scores"));
    }
    debug!(
        "solved LGC system: n={} classes={} beta_f={:.4} alpha_f={:.4} pivot range {:.3e}..{:.3e}",
        n,
        y.ncols(),
        beta_f,
        alpha_f,
        p_min,
        p_max
    );
    Ok(f)
}

/// Normalize `W` and solve for the soft labels `F`.
pub fn propagate(w: &DMatrix<f64>, y: &DMatrix<f64>, mu: f64) -> Result<DMatrix<f64>> {
    let s = normalize_affinity(w)?;
    solve_normalized(&s, y, mu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn chain() -> (DMatrix<f64>, DMatrix<f64>) {
        let w = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        let y = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        (w, y)
    }

    #[test]
    fn degree_is_row_sum() {
        let (w, _) = chain();
        let d = degrees(&w);
        assert_eq!(d.as_slice(), &[1.0, 2.0, 1.0]);
    }

    #[test]
    fn normalized_affinity_is_symmetric() {
        let (w, _) = chain();
        let s = normalize_affinity(&w).unwrap();
        assert_abs_diff_eq!(s[(0, 1)], 1.0 / 2f64.sqrt(), epsilon = 1e-15);
        assert_eq!(s, s.transpose());
    }

    #[test]
    fn zero_degree_region_is_degenerate() {
        let w = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let y = DMatrix::zeros(3, 2);
        match propagate(&w, &y, 1.0) {
            Err(LgcError::DegenerateGraph { region, degree }) => {
                assert_eq!(region, 2);
                assert_eq!(degree, 0.0);
            }
            other => panic!("expected DegenerateGraph, got {other:?}"),
        }
    }

    #[test]
    fn zero_normalized_affinity_scales_y() {
        let (_, y) = chain();
        let s = DMatrix::zeros(3, 3);
        let f = solve_normalized(&s, &y, 0.25).unwrap();
        assert_eq!(f, y * (0.25 / 1.25));
    }

    #[test]
    fn chain_solution_matches_hand_computation() {
        let (w, y) = chain();
        let f = propagate(&w, &y, 1.0).unwrap();
        // a = α_f / √2 with α_f = 1/2; f1 = 0.5a / (1 − 2a²)
        let a = 0.5 / 2f64.sqrt();
        let mid = 0.5 * a / (1.0 - 2.0 * a * a);
        assert_abs_diff_eq!(f[(1, 0)], mid, epsilon = 1e-12);
        assert_abs_diff_eq!(f[(1, 1)], mid, epsilon = 1e-12);
        assert_abs_diff_eq!(f[(0, 0)], 0.5 + a * mid, epsilon = 1e-12);
        assert_abs_diff_eq!(f[(0, 1)], a * mid, epsilon = 1e-12);
        assert_abs_diff_eq!(f[(2, 1)], 0.5 + a * mid, epsilon = 1e-12);
    }

    #[test]
    fn small_mu_drives_scores_to_zero_for_a_contraction() {
        // a connected S has eigenvalue 1, where β_f / (1 − α_f) = 1 cancels;
        // below that spectral radius F shrinks with β_f
        let (w, y) = chain();
        let s = normalize_affinity(&w).unwrap() * 0.5;
        let tiny = solve_normalized(&s, &y, 1e-9).unwrap();
        assert!(tiny.iter().all(|v| v.abs() < 1e-8));
    }

    #[test]
    fn large_mu_recovers_labels() {
        let (w, y) = chain();
        let huge = propagate(&w, &y, 1e9).unwrap();
        assert_abs_diff_eq!(huge[(0, 0)], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(huge[(2, 1)], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(huge[(0, 1)], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn vanishing_mu_on_connected_graph_is_near_singular() {
        // S has eigenvalue 1, so I − α_f·S has a pivot of order β_f
        let (w, y) = chain();
        let s = normalize_affinity(&w).unwrap();
        match solve_normalized(&s, &y, 1e-14) {
            Err(LgcError::NumericalInstability(msg)) => {
                assert!(msg.contains("near-singular"), "{msg}")
            }
            other => panic!("expected NumericalInstability, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_mu_is_rejected() {
        let (w, y) = chain();
        assert!(matches!(
            propagate(&w, &y, 0.0),
            Err(LgcError::Configuration(_))
        ));
    }
}
