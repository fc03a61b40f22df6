use super::accumulator::RegionAccumulator;
use crate::error::{LgcError, Result};
use crate::image::{FeatureField, ImageView, Partition};
use log::debug;

/// Per-region statistics gathered from the pixel grid.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionStats {
    pub pixel_count: usize,
    /// Mean feature vector (`S_i_m`).
    pub mean: Vec<f64>,
    /// Mean `[row, col]` coordinate (`S_i_p`).
    pub centroid: [f64; 2],
}

/// Number of regions `R` in the partition: the largest non-sentinel id plus one.
///
/// Fails when every pixel is masked or when the sentinel does not sit above
/// the region id range.
pub fn region_count(partition: &Partition, sentinel: u32) -> Result<usize> {
    let max_id = partition
        .rows()
        .flat_map(|row| row.iter().copied())
        .filter(|&id| id != sentinel)
        .max()
        .ok_or_else(|| LgcError::shape("partition contains only masked pixels"))?;
    if sentinel <= max_id {
        return Err(LgcError::config(format!(
            "sentinel {sentinel} is ambiguous: region ids reach {max_id}"
        )));
    }
    Ok(max_id as usize + 1)
}

/// Reduce the pixel grid to per-region means and centroids.
///
/// Region ids must cover `[0, R)` without gaps; sentinel pixels are ignored.
pub fn aggregate_regions(
    partition: &Partition,
    features: &FeatureField,
    sentinel: u32,
) -> Result<Vec<RegionStats>> {
    check_shapes(partition, features)?;
    let count = region_count(partition, sentinel)?;
    let mut accs = vec![RegionAccumulator::with_channels(features.channels); count];
    let mut masked = 0usize;
    for (y, row) in partition.rows().enumerate() {
        for (x, &id) in row.iter().enumerate() {
            if id == sentinel {
                masked += 1;
                continue;
            }
            accs[id as usize].push(x, y, features.pixel(x, y));
        }
    }
    if let Some(missing) = accs.iter().position(RegionAccumulator::is_empty) {
        return Err(LgcError::shape(format!(
            "region id {missing} has no pixels; ids must be contiguous in [0, {count})"
        )));
    }
    debug!(
        "aggregated {} regions over {}x{} pixels ({} masked)",
        count, partition.w, partition.h, masked
    );
    Ok(accs
        .iter()
        .map(|acc| RegionStats {
            pixel_count: acc.len(),
            mean: acc.mean_feature(),
            centroid: acc.centroid(),
        })
        .collect())
}

pub(crate) fn check_shapes(partition: &Partition, features: &FeatureField) -> Result<()> {
    if partition.w != features.w || partition.h != features.h {
        return Err(LgcError::ShapeMismatch {
            feature_width: features.w,
            feature_height: features.h,
            partition_width: partition.w,
            partition_height: partition.h,
        });
    }
    Ok(())
}
