//! Region adjacency ("shares a boundary") over a partition.
//!
//! The relation is either derived here by scanning neighbouring pixel pairs
//! or supplied by an external region-adjacency procedure. Either way the
//! sentinel region and self loops are stripped and the relation is stored
//! symmetric with sorted, de-duplicated neighbor lists.

use crate::error::{LgcError, Result};
use crate::image::{ImageView, Partition};
use serde::{Deserialize, Serialize};

/// Pixel neighbourhood used when deriving adjacency from a partition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    Four,
    #[default]
    Eight,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionAdjacency {
    neighbors: Vec<Vec<usize>>,
}

impl RegionAdjacency {
    /// Derive adjacency from boundaries between differently labelled pixels.
    pub fn from_partition(
        partition: &Partition,
        region_count: usize,
        sentinel: u32,
        connectivity: Connectivity,
    ) -> Result<Self> {
        let (w, h) = (partition.width(), partition.height());
        let mut edges = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let a = partition.get(x, y);
                let mut visit = |nx: usize, ny: usize| {
                    let b = partition.get(nx, ny);
                    if a != b {
                        edges.push((a, b));
                    }
                };
                if x + 1 < w {
                    visit(x + 1, y);
                }
                if y + 1 < h {
                    visit(x, y + 1);
                    if connectivity == Connectivity::Eight {
                        if x + 1 < w {
                            visit(x + 1, y + 1);
                        }
                        if x > 0 {
                            visit(x - 1, y + 1);
                        }
                    }
                }
            }
        }
        Self::from_edges(region_count, sentinel, edges)
    }

    /// Build from `neighbor_sets[i]` = ids adjacent to region `i`.
    ///
    /// Entries past `region_count` (e.g. a node standing for the masked area)
    /// are ignored, as are sentinel ids inside the sets.
    pub fn from_neighbor_sets(
        region_count: usize,
        sentinel: u32,
        neighbor_sets: &[Vec<u32>],
    ) -> Result<Self> {
        let edges = neighbor_sets
            .iter()
            .enumerate()
            .take(region_count)
            .flat_map(|(i, set)| set.iter().map(move |&j| (i as u32, j)));
        Self::from_edges(region_count, sentinel, edges)
    }

    /// Build from undirected region pairs.
    pub fn from_edges(
        region_count: usize,
        sentinel: u32,
        edges: impl IntoIterator<Item = (u32, u32)>,
    ) -> Result<Self> {
        let mut neighbors = vec![Vec::new(); region_count];
        for (a, b) in edges {
            if a == sentinel || b == sentinel || a == b {
                continue;
            }
            let (a, b) = (a as usize, b as usize);
            if a >= region_count || b >= region_count {
                return Err(LgcError::shape(format!(
                    "adjacency edge ({a}, {b}) references a region outside [0, {region_count})"
                )));
            }
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }
        Ok(Self { neighbors })
    }

    #[inline]
    pub fn neighbors(&self, region: usize) -> &[usize] {
        &self.neighbors[region]
    }

    pub fn region_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Regions without any neighbor.
    pub fn isolated(&self) -> impl Iterator<Item = usize> + '_ {
        self.neighbors
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.is_empty().then_some(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: u32 = 7;

    #[test]
    fn diagonal_contact_needs_eight_connectivity() {
        // 0 1
        // 2 0   -> 1 and 2 touch only diagonally
        let partition = Partition::from_rows(&[vec![0, 1], vec![2, 0]]).unwrap();
        let four = RegionAdjacency::from_partition(&partition, 3, S, Connectivity::Four).unwrap();
        assert_eq!(four.neighbors(1), &[0]);
        let eight = RegionAdjacency::from_partition(&partition, 3, S, Connectivity::Eight).unwrap();
        assert_eq!(eight.neighbors(1), &[0, 2]);
        assert_eq!(eight.neighbors(2), &[0, 1]);
    }

    #[test]
    fn sentinel_never_becomes_a_neighbor() {
        let partition = Partition::from_rows(&[vec![0, S, 1], vec![0, S, 1]]).unwrap();
        let adj = RegionAdjacency::from_partition(&partition, 2, S, Connectivity::Eight).unwrap();
        assert!(adj.neighbors(0).is_empty());
        assert_eq!(adj.isolated().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn external_sets_are_symmetrized_and_stripped() {
        // node 3 stands for the masked area in the external graph
        let sets = vec![vec![1, S], vec![], vec![1, 2], vec![0, 1]];
        let adj = RegionAdjacency::from_neighbor_sets(3, S, &sets).unwrap();
        assert_eq!(adj.neighbors(0), &[1]);
        assert_eq!(adj.neighbors(1), &[0, 2]);
        assert_eq!(adj.neighbors(2), &[1]);
        assert_eq!(adj.edge_count(), 2);
    }

    #[test]
    fn out_of_range_edge_is_rejected() {
        let err = RegionAdjacency::from_edges(2, S, [(0, 5)]).unwrap_err();
        assert!(matches!(err, LgcError::DataShape(_)));
    }
}
