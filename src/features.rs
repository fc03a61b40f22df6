//! Per-pixel feature preparation ahead of region aggregation.
//!
//! - [`FeatureExtractionMode::StokesToCoherence`] turns a 4-channel Stokes
//!   vector field `(s0, s1, s2, s3)` into compact-polarimetry coherence
//!   elements `(c11, c12_real, c22, c12_imag)`.
//! - Optional per-channel min-max normalization to `[0, 1]`.

use crate::error::{LgcError, Result};
use crate::image::FeatureField;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureExtractionMode {
    /// Use the input channels as-is.
    #[default]
    Raw,
    /// Convert Stokes vectors to coherence elements.
    StokesToCoherence,
}

impl FeatureExtractionMode {
    /// Feature length after extraction for an input with `channels` channels.
    pub fn output_len(self, channels: usize) -> Result<usize> {
        match self {
            Self::Raw => Ok(channels),
            Self::StokesToCoherence if channels == 4 => Ok(4),
            Self::StokesToCoherence => Err(LgcError::config(format!(
                "Stokes conversion needs 4 channels, got {channels}"
            ))),
        }
    }
}

/// Apply the extraction mode and optional normalization, returning a new field.
pub fn prepare_features(
    field: &FeatureField,
    mode: FeatureExtractionMode,
    normalize: bool,
) -> Result<FeatureField> {
    mode.output_len(field.channels)?;
    let mut out = field.clone();
    if mode == FeatureExtractionMode::StokesToCoherence {
        for px in out.pixels_mut() {
            let [s0, s1, s2, s3] = [px[0], px[1], px[2], px[3]];
            px.copy_from_slice(&stokes_to_coherence([s0, s1, s2, s3]));
        }
    }
    if normalize {
        normalize_channels(&mut out);
    }
    Ok(out)
}

/// `(c11, c12_real, c22, c12_imag)` from a Stokes vector.
#[inline]
pub fn stokes_to_coherence(s: [f64; 4]) -> [f64; 4] {
    [
        0.5 * (s[0] + s[1]),
        0.5 * s[2],
        0.5 * (s[0] - s[1]),
        -0.5 * s[3],
    ]
}

/// Min-max scale each channel to `[0, 1]` over the whole field.
///
/// A constant channel carries no information and is set to zero.
pub fn normalize_channels(field: &mut FeatureField) {
    let channels = field.channels;
    let mut lo = vec![f64::INFINITY; channels];
    let mut hi = vec![f64::NEG_INFINITY; channels];
    for px in field.pixels() {
        for (c, &v) in px.iter().enumerate() {
            lo[c] = lo[c].min(v);
            hi[c] = hi[c].max(v);
        }
    }
    for c in 0..channels {
        let span = hi[c] - lo[c];
        if !(span.is_finite() && span > 0.0) {
            warn!("feature channel {c} is constant (span={span}), normalizing to 0");
        }
    }
    for px in field.pixels_mut() {
        for (c, v) in px.iter_mut().enumerate() {
            let span = hi[c] - lo[c];
            *v = if span.is_finite() && span > 0.0 {
                (*v - lo[c]) / span
            } else {
                0.0
            };
        }
    }
    debug!("normalized {channels} feature channels");
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn stokes_conversion_matches_coherence_layout() {
        let c = stokes_to_coherence([4.0, 2.0, 1.0, 0.5]);
        assert_eq!(c, [3.0, 0.5, 1.0, -0.25]);
    }

    #[test]
    fn stokes_mode_requires_four_channels() {
        let field = FeatureField::uniform(2, 2, &[1.0, 2.0]).unwrap();
        let err = prepare_features(&field, FeatureExtractionMode::StokesToCoherence, false);
        assert!(matches!(err, Err(LgcError::Configuration(_))));
    }

    #[test]
    fn normalization_maps_to_unit_range_and_zeroes_constant_channels() {
        let mut field =
            FeatureField::from_vec(3, 1, 2, vec![1.0, 7.0, 3.0, 7.0, 5.0, 7.0]).unwrap();
        normalize_channels(&mut field);
        assert_abs_diff_eq!(field.pixel(0, 0)[0], 0.0);
        assert_abs_diff_eq!(field.pixel(1, 0)[0], 0.5);
        assert_abs_diff_eq!(field.pixel(2, 0)[0], 1.0);
        assert!(field.pixels().all(|px| px[1] == 0.0));
    }
}
