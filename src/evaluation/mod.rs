//! Accuracy assessment of a predicted label map against test points.
//!
//! A test point is compared either against the single predicted pixel or,
//! with windowed evaluation and away from the image border, against the mode
//! of the surrounding 3×3 window (smallest label wins ties). Each scored
//! point is also painted into a ground-truth image for visualization; dropped
//! points leave it untouched.

pub mod confusion;

pub use confusion::ConfusionMatrix;

use crate::annotations::PointAnnotation;
use crate::image::{ImageView, LabelMap};
use crate::propagation::LabelRemapMode;
use log::warn;
use serde::{Deserialize, Serialize};

/// Test points that could not be scored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationDrops {
    pub unlabeled: usize,
    pub out_of_bounds: usize,
    /// Prediction at the point (or window mode) is the sentinel.
    pub masked: usize,
    /// Test code has no class in the remap / class range.
    pub unmapped: usize,
}

impl EvaluationDrops {
    pub fn dropped(&self) -> usize {
        self.unlabeled + self.out_of_bounds + self.masked + self.unmapped
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub confusion: ConfusionMatrix,
    /// True 1-based classes painted at the evaluated locations, 0 elsewhere.
    pub truth_map: LabelMap,
    pub drops: EvaluationDrops,
}

/// Serializable digest of an [`Evaluation`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracySummary {
    pub confusion: Vec<Vec<u64>>,
    pub user_accuracy: Vec<Option<f64>>,
    pub overall_accuracy: f64,
    pub kappa: f64,
    pub samples: u64,
    pub drops: EvaluationDrops,
}

impl Evaluation {
    pub fn summary(&self) -> AccuracySummary {
        AccuracySummary {
            confusion: self.confusion.rows(),
            user_accuracy: self.confusion.user_accuracy(),
            overall_accuracy: self.confusion.overall_accuracy(),
            kappa: self.confusion.kappa(),
            samples: self.confusion.total(),
            drops: self.drops,
        }
    }
}

/// Settings shared by every test point of one evaluation.
#[derive(Clone, Debug)]
pub struct EvaluationSettings<'a> {
    pub class_count: usize,
    pub sentinel: u32,
    pub remap: &'a LabelRemapMode,
    pub windowed: bool,
}

/// Score `tests` against `predicted` and build the confusion matrix.
pub fn evaluate(
    predicted: &LabelMap,
    tests: &[PointAnnotation],
    settings: &EvaluationSettings<'_>,
) -> Evaluation {
    let mut confusion = ConfusionMatrix::new(settings.class_count);
    let mut truth_map = LabelMap::filled(predicted.w, predicted.h, 0);
    let mut drops = EvaluationDrops::default();
    for point in tests {
        let Some(code) = point.code else {
            drops.unlabeled += 1;
            continue;
        };
        if !predicted.contains(point.col, point.row) {
            drops.out_of_bounds += 1;
            continue;
        }
        let truth = match settings.remap.class_index(code) {
            Some(c) if c < settings.class_count => c as u32 + 1,
            _ => {
                drops.unmapped += 1;
                continue;
            }
        };
        let (x, y) = (point.col as usize, point.row as usize);
        let interior = x > 0 && y > 0 && x + 1 < predicted.w && y + 1 < predicted.h;
        let windowed = settings.windowed && interior;
        let guess = if windowed {
            window_mode(predicted, x, y)
        } else {
            predicted.get(x, y)
        };
        if guess == settings.sentinel || !confusion.record(truth, guess) {
            drops.masked += 1;
            continue;
        }
        if windowed {
            for wy in y - 1..=y + 1 {
                for wx in x - 1..=x + 1 {
                    truth_map.set(wx, wy, truth);
                }
            }
        } else {
            truth_map.set(x, y, truth);
        }
    }
    if drops.dropped() > 0 {
        warn!(
            "{} of {} test points were not scored ({:?})",
            drops.dropped(),
            tests.len(),
            drops
        );
    }
    Evaluation {
        confusion,
        truth_map,
        drops,
    }
}

/// Most frequent label in the 3×3 window centred on `(x, y)`; the smallest
/// label wins ties. The window must lie inside the map.
pub fn window_mode(map: &LabelMap, x: usize, y: usize) -> u32 {
    let mut values = [0u32; 9];
    let mut k = 0;
    for wy in y - 1..=y + 1 {
        for wx in x - 1..=x + 1 {
            values[k] = map.get(wx, wy);
            k += 1;
        }
    }
    values.sort_unstable();
    let (mut best, mut best_count) = (values[0], 0usize);
    let mut i = 0;
    while i < values.len() {
        let v = values[i];
        let run = values[i..].iter().take_while(|&&u| u == v).count();
        if run > best_count {
            best = v;
            best_count = run;
        }
        i += run;
    }
    best
}
