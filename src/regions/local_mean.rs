use super::adjacency::RegionAdjacency;
use crate::error::Result;
use crate::metric::DistanceMetricKind;
use log::debug;

/// Neighbor-weighted mean feature per region (`S_i_w`).
///
/// For region `i` with neighbors `N(i)`, weights are
/// `w_ij = exp(−d(m_i, m_j) / weight_scalar)` normalized over `N(i)`, and
/// `S_i_w[i] = Σ_j w_ij · m_j`. A region without neighbors gets the zero
/// vector.
pub fn neighbor_weighted_means(
    means: &[Vec<f64>],
    adjacency: &RegionAdjacency,
    metric: DistanceMetricKind,
    weight_scalar: f64,
) -> Result<Vec<Vec<f64>>> {
    let feature_len = means.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(means.len());
    let mut isolated = 0usize;
    let mut dists = Vec::new();
    for (i, mean_i) in means.iter().enumerate() {
        let neighbors = adjacency.neighbors(i);
        let mut smoothed = vec![0.0; feature_len];
        if neighbors.is_empty() {
            isolated += 1;
            out.push(smoothed);
            continue;
        }
        dists.clear();
        for &j in neighbors {
            dists.push(metric.distance(mean_i, &means[j])?);
        }
        // shifting by the smallest distance leaves the normalized weights
        // unchanged and keeps the largest weight at exactly 1
        let d_min = dists.iter().copied().fold(f64::INFINITY, f64::min);
        let weights: Vec<f64> = dists
            .iter()
            .map(|d| (-(d - d_min) / weight_scalar).exp())
            .collect();
        let total: f64 = weights.iter().sum();
        for (&j, w) in neighbors.iter().zip(&weights) {
            let w = w / total;
            for (acc, v) in smoothed.iter_mut().zip(&means[j]) {
                *acc += w * v;
            }
        }
        out.push(smoothed);
    }
    if isolated > 0 {
        debug!("{isolated} regions without neighbors keep a zero smoothed mean");
    }
    Ok(out)
}
