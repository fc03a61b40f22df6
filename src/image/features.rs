//! Owned multi-channel f64 raster (pixel-interleaved, row-major).
use crate::error::{LgcError, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFeatureField")]
pub struct FeatureField {
    /// Image width in pixels
    #[serde(rename = "width")]
    pub w: usize,
    /// Image height in pixels
    #[serde(rename = "height")]
    pub h: usize,
    /// Feature vector length per pixel
    pub channels: usize,
    /// `w * h * channels` values, one pixel's channels stored contiguously
    pub data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawFeatureField {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<f64>,
}

impl TryFrom<RawFeatureField> for FeatureField {
    type Error = LgcError;

    fn try_from(raw: RawFeatureField) -> Result<Self> {
        FeatureField::from_vec(raw.width, raw.height, raw.channels, raw.data)
    }
}

impl FeatureField {
    /// Zero-initialized field of size `w × h × channels`.
    pub fn new(w: usize, h: usize, channels: usize) -> Result<Self> {
        Self::from_vec(w, h, channels, vec![0.0; w * h * channels])
    }

    pub fn from_vec(w: usize, h: usize, channels: usize, data: Vec<f64>) -> Result<Self> {
        check_channels(channels)?;
        if data.len() != w * h * channels {
            return Err(LgcError::shape(format!(
                "feature field {w}x{h}x{channels} needs {} values, got {}",
                w * h * channels,
                data.len()
            )));
        }
        Ok(Self {
            w,
            h,
            channels,
            data,
        })
    }

    /// Same vector at every pixel.
    pub fn uniform(w: usize, h: usize, value: &[f64]) -> Result<Self> {
        Self::from_vec(w, h, value.len(), value.repeat(w * h))
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[f64] {
        let start = (y * self.w + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [f64] {
        let start = (y * self.w + x) * self.channels;
        &mut self.data[start..start + self.channels]
    }

    /// Iterate pixel vectors in row-major order.
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.channels)
    }

    pub fn pixels_mut(&mut self) -> std::slice::ChunksExactMut<'_, f64> {
        self.data.chunks_exact_mut(self.channels)
    }
}

/// Every pixel needs a non-empty feature vector.
pub(crate) fn check_channels(channels: usize) -> Result<()> {
    if channels == 0 {
        return Err(LgcError::shape("feature field needs at least one channel"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_channels_are_rejected_by_every_constructor() {
        assert!(matches!(
            FeatureField::new(2, 1, 0),
            Err(LgcError::DataShape(_))
        ));
        assert!(matches!(
            FeatureField::uniform(2, 1, &[]),
            Err(LgcError::DataShape(_))
        ));
        assert!(FeatureField::from_vec(2, 1, 0, Vec::new()).is_err());
    }

    #[test]
    fn pixels_are_channel_sized_chunks() {
        let field = FeatureField::uniform(3, 2, &[1.0, 2.0]).unwrap();
        assert_eq!(field.pixels().count(), 6);
        assert!(field.pixels().all(|px| px == [1.0, 2.0]));
    }
}
