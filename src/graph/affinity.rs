use super::NeighborSelectionMode;
use crate::error::Result;
use crate::metric::{euclidean_squared, DistanceMetricKind};
use crate::params::ClassifierParams;
use crate::regions::{Region, RegionSet};
use log::debug;
use nalgebra::DMatrix;
use std::cmp::Ordering;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Builds the symmetric region-region weight matrix `W`.
///
/// Each entry combines a two-scale feature kernel and a spatial kernel:
///
/// ```text
/// s = exp(((β − 1)·d(w_i, w_j) − β·d(m_i, m_j)) / (2σ_s²))
/// l = exp(−|p_i − p_j|² / (2σ_l²))
/// W[i, j] = s · l
/// ```
///
/// where `m` are region means, `w` neighbor-weighted means and `p` centroids.
/// The diagonal stays zero.
#[derive(Clone, Debug)]
pub struct AffinityBuilder {
    beta: f64,
    two_sigma_s_sq: f64,
    two_sigma_l_sq: f64,
    metric: DistanceMetricKind,
    selection: NeighborSelectionMode,
}

impl AffinityBuilder {
    pub fn new(params: &ClassifierParams) -> Self {
        Self {
            beta: params.beta,
            two_sigma_s_sq: 2.0 * params.sigma_s * params.sigma_s,
            two_sigma_l_sq: 2.0 * params.sigma_l * params.sigma_l,
            metric: params.metric,
            selection: params.neighbor_selection,
        }
    }

    /// Affinity between two distinct regions.
    pub fn pair_weight(&self, a: &Region, b: &Region) -> Result<f64> {
        // with β = 1 the smoothed term vanishes; skip it so isolated regions
        // (zero smoothed mean) stay usable with the coherence metric
        let smoothed_term = if self.beta < 1.0 {
            (self.beta - 1.0) * self.metric.distance(&a.smoothed, &b.smoothed)?
        } else {
            0.0
        };
        let mean_term = if self.beta > 0.0 {
            self.beta * self.metric.distance(&a.mean, &b.mean)?
        } else {
            0.0
        };
        let s = ((smoothed_term - mean_term) / self.two_sigma_s_sq).exp();
        let l = (-euclidean_squared(&a.centroid, &b.centroid) / self.two_sigma_l_sq).exp();
        Ok(s * l)
    }

    /// Fill `W` for every region pair selected by the neighbor-selection mode.
    pub fn build(&self, regions: &RegionSet) -> Result<DMatrix<f64>> {
        let n = regions.len();
        let mut w = DMatrix::<f64>::zeros(n, n);
        if n == 0 {
            return Ok(w);
        }
        let rs = &regions.regions;
        match self.selection {
            NeighborSelectionMode::Full => {
                // column j holds W[i, j] for i < j; the lower triangle is mirrored after
                fill_columns(w.as_mut_slice(), n, |j, col| {
                    for (i, slot) in col.iter_mut().enumerate().take(j) {
                        *slot = self.pair_weight(&rs[i], &rs[j])?;
                    }
                    Ok(())
                })?;
                for j in 0..n {
                    for i in 0..j {
                        w[(j, i)] = w[(i, j)];
                    }
                }
            }
            NeighborSelectionMode::KNearest { k } => {
                fill_columns(w.as_mut_slice(), n, |j, col| {
                    for i in spatial_nearest(rs, j, k) {
                        col[i] = self.pair_weight(&rs[j], &rs[i])?;
                    }
                    Ok(())
                })?;
                symmetrize_max(&mut w);
            }
        }
        debug!(
            "affinity {:?}: {}x{} matrix, {} non-zero entries",
            self.selection,
            n,
            n,
            w.iter().filter(|&&v| v != 0.0).count()
        );
        Ok(w)
    }
}

/// Run `fill(j, column_j)` over the columns of a column-major `n × n` buffer.
///
/// Columns are disjoint, so the parallel path needs no synchronization.
fn fill_columns<F>(data: &mut [f64], n: usize, fill: F) -> Result<()>
where
    F: Fn(usize, &mut [f64]) -> Result<()> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        data.par_chunks_mut(n)
            .enumerate()
            .try_for_each(|(j, col)| fill(j, col))
    }
    #[cfg(not(feature = "parallel"))]
    {
        data.chunks_mut(n)
            .enumerate()
            .try_for_each(|(j, col)| fill(j, col))
    }
}

/// The `k` regions closest to `center` by centroid distance, ties by id.
pub fn spatial_nearest(regions: &[Region], center: usize, k: usize) -> Vec<usize> {
    let origin = regions[center].centroid;
    let mut candidates: Vec<(f64, usize)> = regions
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != center)
        .map(|(i, r)| (euclidean_squared(&origin, &r.centroid), i))
        .collect();
    let by_distance = |a: &(f64, usize), b: &(f64, usize)| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    };
    let k = k.min(candidates.len());
    if k == 0 {
        return Vec::new();
    }
    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, by_distance);
        candidates.truncate(k);
    }
    candidates.sort_unstable_by(by_distance);
    candidates.into_iter().map(|(_, i)| i).collect()
}

/// `W ← max(W, Wᵀ)`: keep an edge if either endpoint selected the other.
pub fn symmetrize_max(w: &mut DMatrix<f64>) {
    let n = w.nrows();
    for j in 0..n {
        for i in 0..j {
            let v = w[(i, j)].max(w[(j, i)]);
            w[(i, j)] = v;
            w[(j, i)] = v;
        }
    }
}
