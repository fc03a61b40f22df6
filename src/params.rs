//! Parameter types configuring the classifier stages.
//!
//! One immutable [`ClassifierParams`] value is threaded through every stage:
//! feature preparation, region aggregation, neighbor smoothing, affinity
//! construction, label initialization, propagation and evaluation.
//!
//! Defaults follow the values used for sea-ice scenes: strong raw-feature
//! weighting (`beta = 0.9`), a wide spatial kernel (`sigma_l = 1000`) and a
//! small propagation weight (`mu = 0.1`). For tuning, start with `sigma_s`
//! and `mu`.

use crate::error::{LgcError, Result};
use crate::features::FeatureExtractionMode;
use crate::graph::NeighborSelectionMode;
use crate::image::features::check_channels;
use crate::metric::DistanceMetricKind;
use crate::propagation::LabelRemapMode;
use crate::regions::Connectivity;
use serde::{Deserialize, Serialize};

/// Partition value marking masked (e.g. land) pixels.
pub const DEFAULT_SENTINEL: u32 = 10_000_000;

/// Classifier-wide parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    /// Scale of the exponential kernel used for neighbor smoothing (`S_i_w`).
    /// Larger values flatten the neighbor weights.
    pub weight_scalar: f64,
    /// Width of the feature-similarity kernel.
    pub sigma_s: f64,
    /// Width of the spatial kernel; region centroids are pixels apart, so keep it large.
    pub sigma_l: f64,
    /// Balance in [0, 1]; larger values favour raw region means over smoothed means.
    pub beta: f64,
    /// LGC mixing weight (> 0); `β_f = μ / (μ + 1)`.
    pub mu: f64,
    pub metric: DistanceMetricKind,
    pub neighbor_selection: NeighborSelectionMode,
    pub feature_mode: FeatureExtractionMode,
    /// Min-max scale every feature channel to [0, 1] before aggregation.
    pub normalize_features: bool,
    pub label_remap: LabelRemapMode,
    /// Explicit class count. `None` infers it from the remap mode / training codes.
    pub class_count: Option<usize>,
    pub sentinel: u32,
    /// Evaluate test points by the 3×3 mode around them instead of one pixel.
    pub windowed_evaluation: bool,
    /// Pixel connectivity used when deriving adjacency from the partition.
    pub connectivity: Connectivity,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            weight_scalar: 10.0,
            sigma_s: 1.0,
            sigma_l: 1000.0,
            beta: 0.9,
            mu: 0.1,
            metric: DistanceMetricKind::default(),
            neighbor_selection: NeighborSelectionMode::default(),
            feature_mode: FeatureExtractionMode::default(),
            normalize_features: false,
            label_remap: LabelRemapMode::default(),
            class_count: None,
            sentinel: DEFAULT_SENTINEL,
            windowed_evaluation: true,
            connectivity: Connectivity::default(),
        }
    }
}

impl ClassifierParams {
    /// Reject parameter combinations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        positive("weight_scalar", self.weight_scalar)?;
        positive("sigma_s", self.sigma_s)?;
        positive("sigma_l", self.sigma_l)?;
        positive("mu", self.mu)?;
        if !(0.0..=1.0).contains(&self.beta) {
            return Err(LgcError::config(format!(
                "beta must lie in [0, 1], got {}",
                self.beta
            )));
        }
        if let NeighborSelectionMode::KNearest { k } = self.neighbor_selection {
            if k == 0 {
                return Err(LgcError::config("k-nearest selection needs k >= 1"));
            }
        }
        if self.class_count == Some(0) {
            return Err(LgcError::config("class count must be at least 1"));
        }
        self.label_remap.validate(self.class_count)?;
        Ok(())
    }

    /// Check the metric against the feature length produced by `feature_mode`.
    pub fn validate_feature_len(&self, input_channels: usize) -> Result<usize> {
        check_channels(input_channels)?;
        let len = self.feature_mode.output_len(input_channels)?;
        if let Some(required) = self.metric.required_len() {
            if len != required {
                return Err(LgcError::config(format!(
                    "{:?} metric needs {required} features per pixel, got {len}",
                    self.metric
                )));
            }
        }
        Ok(len)
    }

    /// `(β_f, α_f)` derived from `mu`.
    pub fn propagation_weights(&self) -> (f64, f64) {
        propagation_weights(self.mu)
    }
}

/// `β_f = μ / (μ + 1)`, `α_f = 1 − β_f`.
pub fn propagation_weights(mu: f64) -> (f64, f64) {
    let beta_f = mu / (mu + 1.0);
    (beta_f, 1.0 - beta_f)
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(LgcError::config(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}
