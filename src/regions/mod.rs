//! Region-level view of the partition.
//!
//! Overview
//! - [`aggregate_regions`] reduces the pixel grid to one mean feature vector
//!   (`S_i_m`) and one mean `[row, col]` coordinate (`S_i_p`) per region.
//! - [`RegionAdjacency`] holds the boundary-sharing relation, derived from the
//!   partition or supplied externally, with the sentinel stripped.
//! - [`neighbor_weighted_means`] smooths each region's mean over its
//!   neighbors (`S_i_w`).
//!
//! [`RegionSet`] bundles the three derived quantities; it is built once and
//! read concurrently by the affinity stage.

mod accumulator;
pub mod adjacency;
pub mod aggregate;
pub mod local_mean;

pub use adjacency::{Connectivity, RegionAdjacency};
pub use aggregate::{aggregate_regions, region_count, RegionStats};
pub use local_mean::neighbor_weighted_means;

use crate::error::{LgcError, Result};
use crate::metric::DistanceMetricKind;

/// A partition region with its derived statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub id: usize,
    pub pixel_count: usize,
    /// Mean feature vector (`S_i_m`).
    pub mean: Vec<f64>,
    /// Neighbor-weighted mean feature vector (`S_i_w`).
    pub smoothed: Vec<f64>,
    /// Mean `[row, col]` coordinate (`S_i_p`).
    pub centroid: [f64; 2],
    /// Adjacent region ids, sentinel excluded.
    pub neighbors: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionSet {
    pub regions: Vec<Region>,
}

impl RegionSet {
    /// Combine aggregated statistics with an adjacency relation and compute
    /// the neighbor-weighted means.
    pub fn build(
        stats: Vec<RegionStats>,
        adjacency: &RegionAdjacency,
        metric: DistanceMetricKind,
        weight_scalar: f64,
    ) -> Result<Self> {
        if adjacency.region_count() != stats.len() {
            return Err(LgcError::shape(format!(
                "adjacency covers {} regions but the partition has {}",
                adjacency.region_count(),
                stats.len()
            )));
        }
        let means: Vec<Vec<f64>> = stats.iter().map(|s| s.mean.clone()).collect();
        let smoothed = neighbor_weighted_means(&means, adjacency, metric, weight_scalar)?;
        let regions = stats
            .into_iter()
            .zip(smoothed)
            .enumerate()
            .map(|(id, (s, smoothed))| Region {
                id,
                pixel_count: s.pixel_count,
                mean: s.mean,
                smoothed,
                centroid: s.centroid,
                neighbors: adjacency.neighbors(id).to_vec(),
            })
            .collect();
        Ok(Self { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Region> {
        self.regions.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }
}
