use crate::error::{LgcError, Result};
use crate::image::{ImageView, LabelMap, Partition};
use nalgebra::DMatrix;

/// Scores within this relative distance of the row maximum count as tied.
pub const TIE_REL_EPS: f64 = 1e-12;

/// Hard label per region: 1-based index of the largest score.
///
/// Ties (within [`TIE_REL_EPS`]) go to the lowest class index, so solver
/// round-off between symmetric classes cannot flip the decision.
pub fn decode_labels(f: &DMatrix<f64>) -> Vec<u32> {
    f.row_iter()
        .map(|row| {
            let best = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let floor = best - TIE_REL_EPS * best.abs();
            let idx = row.iter().position(|&v| v >= floor).unwrap_or(0);
            idx as u32 + 1
        })
        .collect()
}

/// Paint each region's hard label onto its pixels; sentinel pixels keep the
/// sentinel.
pub fn broadcast_labels(
    partition: &Partition,
    region_labels: &[u32],
    sentinel: u32,
) -> Result<LabelMap> {
    let mut map = LabelMap::filled(partition.w, partition.h, sentinel);
    for (y, row) in partition.rows().enumerate() {
        for (x, &id) in row.iter().enumerate() {
            if id == sentinel {
                continue;
            }
            let label = region_labels.get(id as usize).copied().ok_or_else(|| {
                LgcError::shape(format!(
                    "pixel ({x}, {y}) references region {id} without a decoded label"
                ))
            })?;
            map.set(x, y, label);
        }
    }
    Ok(map)
}
