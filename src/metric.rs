//! Distance functions between region feature vectors.
//!
//! Two variants are available, chosen once in [`crate::ClassifierParams`]:
//!
//! - [`DistanceMetricKind::EuclideanSquared`]: `Σ (a_k − b_k)²`.
//! - [`DistanceMetricKind::ComplexCoherence`]: interprets a 4-vector
//!   `(c11, c12_real, c22, c12_imag)` as a 2×2 Hermitian coherence matrix and
//!   returns `max(tr(Ca⁻¹ Cb), tr(Cb⁻¹ Ca))`. This is a symmetrized
//!   divergence rather than a metric; it equals 2 for identical operands.

use crate::error::{LgcError, Result};
use nalgebra::{Complex, Matrix2};
use serde::{Deserialize, Serialize};

/// Coherence samples must carry exactly these four elements.
pub const COHERENCE_LEN: usize = 4;

const SINGULAR_REL_EPS: f64 = 1e-12;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetricKind {
    #[default]
    EuclideanSquared,
    ComplexCoherence,
}

impl DistanceMetricKind {
    /// Evaluate the metric. Only the coherence variant can fail.
    #[inline]
    pub fn distance(self, a: &[f64], b: &[f64]) -> Result<f64> {
        match self {
            Self::EuclideanSquared => Ok(euclidean_squared(a, b)),
            Self::ComplexCoherence => coherence_distance(a, b),
        }
    }

    /// Feature length the metric insists on, if any.
    pub fn required_len(self) -> Option<usize> {
        match self {
            Self::EuclideanSquared => None,
            Self::ComplexCoherence => Some(COHERENCE_LEN),
        }
    }
}

#[inline]
pub fn euclidean_squared(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Hermitian 2×2 coherence matrix from `(c11, c12_real, c22, c12_imag)`.
pub fn coherence_matrix(v: &[f64]) -> Result<Matrix2<Complex<f64>>> {
    if v.len() != COHERENCE_LEN {
        return Err(LgcError::config(format!(
            "coherence distance needs {COHERENCE_LEN} elements, got {}",
            v.len()
        )));
    }
    let (c11, c12r, c22, c12i) = (v[0], v[1], v[2], v[3]);
    Ok(Matrix2::new(
        Complex::new(c11, 0.0),
        Complex::new(c12r, c12i),
        Complex::new(c12r, -c12i),
        Complex::new(c22, 0.0),
    ))
}

fn inverse_checked(c: &Matrix2<Complex<f64>>, v: &[f64]) -> Result<Matrix2<Complex<f64>>> {
    // det = c11·c22 − |c12|², real for a Hermitian matrix
    let det = c.determinant().re;
    let scale = (c[(0, 0)].re * c[(1, 1)].re).abs().max(c[(0, 1)].norm_sqr());
    if !det.is_finite() || det.abs() <= SINGULAR_REL_EPS * scale || det == 0.0 {
        return Err(LgcError::numeric(format!(
            "coherence sample {v:?} is not invertible (det={det:e})"
        )));
    }
    c.try_inverse()
        .ok_or_else(|| LgcError::numeric(format!("coherence sample {v:?} is not invertible")))
}

/// `max(tr(Ca⁻¹ Cb), tr(Cb⁻¹ Ca))`, both traces real by Hermitian symmetry.
pub fn coherence_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    let ca = coherence_matrix(a)?;
    let cb = coherence_matrix(b)?;
    let ia = inverse_checked(&ca, a)?;
    let ib = inverse_checked(&cb, b)?;
    let ab = (ia * cb).trace().re;
    let ba = (ib * ca).trace().re;
    let d = ab.max(ba);
    if !d.is_finite() {
        return Err(LgcError::numeric(format!(
            "coherence distance between {a:?} and {b:?} is not finite"
        )));
    }
    Ok(d)
}
