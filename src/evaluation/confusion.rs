use serde::{Deserialize, Serialize};

/// Square confusion matrix over classes `1..=C`; rows are true classes,
/// columns predicted classes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    classes: usize,
    counts: Vec<u64>,
}

impl ConfusionMatrix {
    pub fn new(classes: usize) -> Self {
        Self {
            classes,
            counts: vec![0; classes * classes],
        }
    }

    /// Build from explicit rows (`rows[true][pred]`).
    pub fn from_rows(rows: &[Vec<u64>]) -> Option<Self> {
        let classes = rows.len();
        if rows.iter().any(|r| r.len() != classes) {
            return None;
        }
        Some(Self {
            classes,
            counts: rows.concat(),
        })
    }

    pub fn classes(&self) -> usize {
        self.classes
    }

    /// Count one sample; classes are 1-based. Returns false when either
    /// class is outside `1..=C`.
    pub fn record(&mut self, truth: u32, predicted: u32) -> bool {
        let c = self.classes as u32;
        if truth == 0 || predicted == 0 || truth > c || predicted > c {
            return false;
        }
        let idx = (truth as usize - 1) * self.classes + predicted as usize - 1;
        self.counts[idx] += 1;
        true
    }

    /// Count at 0-based `(true, predicted)`.
    #[inline]
    pub fn get(&self, truth: usize, predicted: usize) -> u64 {
        self.counts[truth * self.classes + predicted]
    }

    pub fn rows(&self) -> Vec<Vec<u64>> {
        self.counts
            .chunks(self.classes.max(1))
            .map(<[u64]>::to_vec)
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    fn row_sum(&self, c: usize) -> u64 {
        (0..self.classes).map(|p| self.get(c, p)).sum()
    }

    fn col_sum(&self, c: usize) -> u64 {
        (0..self.classes).map(|t| self.get(t, c)).sum()
    }

    fn trace(&self) -> u64 {
        (0..self.classes).map(|c| self.get(c, c)).sum()
    }

    /// Per-class user accuracy `diag / row sum`; `None` for a class without
    /// test samples.
    pub fn user_accuracy(&self) -> Vec<Option<f64>> {
        (0..self.classes)
            .map(|c| {
                let row = self.row_sum(c);
                (row > 0).then(|| self.get(c, c) as f64 / row as f64)
            })
            .collect()
    }

    /// Fraction of samples on the diagonal (0 for an empty matrix).
    pub fn overall_accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.trace() as f64 / total as f64
    }

    /// Cohen's kappa `(p_o − p_e) / (1 − p_e)`.
    ///
    /// When chance agreement is total (`p_e = 1`) kappa is 1 for perfect
    /// observed agreement and 0 otherwise.
    pub fn kappa(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let n = total as f64;
        let p_o = self.trace() as f64 / n;
        let p_e = (0..self.classes)
            .map(|c| self.row_sum(c) as f64 * self.col_sum(c) as f64)
            .sum::<f64>()
            / (n * n);
        let denom = 1.0 - p_e;
        if denom.abs() <= f64::EPSILON {
            return if p_o >= 1.0 { 1.0 } else { 0.0 };
        }
        (p_o - p_e) / denom
    }
}
