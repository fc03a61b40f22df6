//! Owned integer raster in row-major layout.
//!
//! The same container carries the oversegmentation (region ids plus one
//! sentinel for masked pixels) and every label map derived from it.
use crate::error::{LgcError, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLabelGrid")]
pub struct LabelGrid {
    /// Image width in pixels
    #[serde(rename = "width")]
    pub w: usize,
    /// Image height in pixels
    #[serde(rename = "height")]
    pub h: usize,
    /// Backing storage in row-major order
    pub data: Vec<u32>,
}

/// Region ids per pixel; one reserved value marks excluded pixels.
pub type Partition = LabelGrid;
/// Per-pixel class ids (1-based) with the sentinel preserved.
pub type LabelMap = LabelGrid;

#[derive(Deserialize)]
struct RawLabelGrid {
    width: usize,
    height: usize,
    data: Vec<u32>,
}

impl TryFrom<RawLabelGrid> for LabelGrid {
    type Error = LgcError;

    fn try_from(raw: RawLabelGrid) -> Result<Self> {
        LabelGrid::from_vec(raw.width, raw.height, raw.data)
    }
}

impl LabelGrid {
    /// Construct a grid of size `w × h` filled with `value`.
    pub fn filled(w: usize, h: usize, value: u32) -> Self {
        Self {
            w,
            h,
            data: vec![value; w * h],
        }
    }

    /// Wrap a row-major buffer, checking that it covers `w × h` pixels.
    pub fn from_vec(w: usize, h: usize, data: Vec<u32>) -> Result<Self> {
        if data.len() != w * h {
            return Err(LgcError::shape(format!(
                "label grid {w}x{h} needs {} values, got {}",
                w * h,
                data.len()
            )));
        }
        Ok(Self { w, h, data })
    }

    /// Build from nested rows (`rows[y][x]`); handy for small fixtures.
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self> {
        let h = rows.len();
        let w = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != w) {
            return Err(LgcError::shape("label grid rows have unequal lengths"));
        }
        Self::from_vec(w, h, rows.concat())
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Value at signed coordinates, `None` outside the raster.
    #[inline]
    pub fn lookup(&self, x: i64, y: i64) -> Option<u32> {
        use super::ImageView;
        self.contains(x, y).then(|| self.get(x as usize, y as usize))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl crate::image::traits::ImageView for LabelGrid {
    type Pixel = u32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[u32] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
}
