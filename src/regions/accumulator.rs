/// Running sums for one region while scanning the partition.
#[derive(Clone, Debug)]
pub(crate) struct RegionAccumulator {
    pub sum_x: f64,
    pub sum_y: f64,
    pub sum_feat: Vec<f64>,
    pub count: usize,
}

impl RegionAccumulator {
    pub(crate) fn with_channels(channels: usize) -> Self {
        Self {
            sum_x: 0.0,
            sum_y: 0.0,
            sum_feat: vec![0.0; channels],
            count: 0,
        }
    }

    pub(crate) fn push(&mut self, x: usize, y: usize, feat: &[f64]) {
        self.sum_x += x as f64;
        self.sum_y += y as f64;
        for (acc, &v) in self.sum_feat.iter_mut().zip(feat) {
            *acc += v;
        }
        self.count += 1;
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Mean feature vector; zero for an empty accumulator.
    pub(crate) fn mean_feature(&self) -> Vec<f64> {
        if self.count == 0 {
            return vec![0.0; self.sum_feat.len()];
        }
        let n = self.count as f64;
        self.sum_feat.iter().map(|s| s / n).collect()
    }

    /// Mean `[row, col]` coordinate.
    pub(crate) fn centroid(&self) -> [f64; 2] {
        if self.count == 0 {
            return [0.0, 0.0];
        }
        let n = self.count as f64;
        [self.sum_y / n, self.sum_x / n]
    }
}
