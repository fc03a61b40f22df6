//! Region graph affinity construction.
//!
//! Two neighbor-selection modes are supported:
//!
//! - `Full`: every unordered region pair gets a weight. `O(R²)` kernel
//!   evaluations, filled column by column in parallel.
//! - `KNearest { k }`: each region only connects to its `k` spatially closest
//!   regions (by centroid). The directed k-NN relation is symmetrized with
//!   `W = max(W, Wᵀ)`, so an edge survives if either endpoint selected it.

pub mod affinity;

pub use affinity::{spatial_nearest, symmetrize_max, AffinityBuilder};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborSelectionMode {
    #[default]
    Full,
    KNearest {
        k: usize,
    },
}
