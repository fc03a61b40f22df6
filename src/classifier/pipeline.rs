//! Classifier pipeline driving label propagation end-to-end.
//!
//! [`LgcClassifier`] takes a partition, a per-pixel feature field and sparse
//! point annotations and returns hard labels per region and per pixel,
//! together with the intermediate quantities and stage timings.
//!
//! Typical usage:
//! ```no_run
//! use superpixel_lgc::{ClassifierParams, LgcClassifier};
//! use superpixel_lgc::annotations::PointAnnotation;
//! use superpixel_lgc::image::{FeatureField, Partition};
//!
//! # fn example(partition: Partition, features: FeatureField, train: Vec<PointAnnotation>) {
//! let classifier = LgcClassifier::new(ClassifierParams::default());
//! let result = classifier.classify(&partition, &features, &train).unwrap();
//! println!("{} regions, {} classes", result.regions.len(), result.class_count);
//! # }
//! ```
use crate::annotations::PointAnnotation;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{
    ClassificationReport, GraphStage, InputDescriptor, PropagationStage, TimingBreakdown,
};
use crate::error::Result;
use crate::evaluation::{evaluate, Evaluation, EvaluationSettings};
use crate::features::prepare_features;
use crate::graph::AffinityBuilder;
use crate::image::{FeatureField, LabelMap, Partition};
use crate::params::ClassifierParams;
use crate::propagation::{
    broadcast_labels, decode_labels, degrees, init_label_matrix, propagate, AnnotationDrops,
};
use crate::regions::aggregate::check_shapes;
use crate::regions::{aggregate_regions, RegionAdjacency, RegionSet};
use log::{debug, info};
use nalgebra::DMatrix;
use std::time::Instant;

/// Output of one classification run.
#[derive(Clone, Debug)]
pub struct Classification {
    pub regions: RegionSet,
    pub adjacency: RegionAdjacency,
    /// Symmetric region affinity `W`.
    pub affinity: DMatrix<f64>,
    /// Soft label matrix `F` (regions × classes).
    pub soft_labels: DMatrix<f64>,
    /// 1-based hard label per region.
    pub region_labels: Vec<u32>,
    /// Hard labels broadcast to pixels; masked pixels keep the sentinel.
    pub label_map: LabelMap,
    /// Training labels broadcast to pixels (0 = unlabeled region).
    pub training_map: LabelMap,
    pub label_drops: AnnotationDrops,
    pub labeled_regions: usize,
    pub class_count: usize,
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
}

/// Local-and-global-consistency classifier over superpixel regions.
#[derive(Clone, Debug, Default)]
pub struct LgcClassifier {
    params: ClassifierParams,
}

impl LgcClassifier {
    pub fn new(params: ClassifierParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ClassifierParams {
        &self.params
    }

    /// Classify with adjacency derived from the partition itself.
    pub fn classify(
        &self,
        partition: &Partition,
        features: &FeatureField,
        train: &[PointAnnotation],
    ) -> Result<Classification> {
        self.run(partition, features, None, train)
    }

    /// Classify with an externally supplied region adjacency.
    pub fn classify_with_adjacency(
        &self,
        partition: &Partition,
        features: &FeatureField,
        adjacency: &RegionAdjacency,
        train: &[PointAnnotation],
    ) -> Result<Classification> {
        self.run(partition, features, Some(adjacency), train)
    }

    fn run(
        &self,
        partition: &Partition,
        features: &FeatureField,
        adjacency: Option<&RegionAdjacency>,
        train: &[PointAnnotation],
    ) -> Result<Classification> {
        let p = &self.params;
        p.validate()?;
        p.validate_feature_len(features.channels)?;
        check_shapes(partition, features)?;
        let class_count = p.label_remap.class_count(p.class_count, train)?;
        debug!(
            "LgcClassifier::classify start w={} h={} channels={} train_points={}",
            partition.w,
            partition.h,
            features.channels,
            train.len()
        );
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();

        let stage = Instant::now();
        let prepared = prepare_features(features, p.feature_mode, p.normalize_features)?;
        let stats = aggregate_regions(partition, &prepared, p.sentinel)?;
        let region_count = stats.len();
        timings.push_since("aggregate", stage);

        let stage = Instant::now();
        let adjacency = match adjacency {
            Some(adj) => adj.clone(),
            None => {
                RegionAdjacency::from_partition(partition, region_count, p.sentinel, p.connectivity)?
            }
        };
        let regions = RegionSet::build(stats, &adjacency, p.metric, p.weight_scalar)?;
        timings.push_since("local_mean", stage);

        let stage = Instant::now();
        let affinity = AffinityBuilder::new(p).build(&regions)?;
        timings.push_since("affinity", stage);

        let stage = Instant::now();
        let labels = init_label_matrix(
            partition,
            region_count,
            class_count,
            p.sentinel,
            &p.label_remap,
            train,
        );
        timings.push_since("labels", stage);

        let stage = Instant::now();
        let soft_labels = propagate(&affinity, &labels.y, p.mu)?;
        timings.push_since("propagate", stage);

        let stage = Instant::now();
        let region_labels = decode_labels(&soft_labels);
        let label_map = broadcast_labels(partition, &region_labels, p.sentinel)?;
        let training_map = labels.training_map(partition, p.sentinel);
        timings.push_since("decode", stage);

        timings.total_ms = elapsed_ms(total_start);
        let masked_pixels = partition.data.iter().filter(|&&id| id == p.sentinel).count();
        info!(
            "classified {} regions into {} classes ({} labeled) in {:.2} ms",
            region_count,
            class_count,
            labels.labeled_regions(),
            timings.total_ms
        );

        Ok(Classification {
            labeled_regions: labels.labeled_regions(),
            label_drops: labels.drops,
            input: InputDescriptor {
                width: partition.w,
                height: partition.h,
                channels: features.channels,
                masked_pixels,
            },
            regions,
            adjacency,
            affinity,
            soft_labels,
            region_labels,
            label_map,
            training_map,
            class_count,
            timings,
        })
    }

    /// Score a classification against held-out test points.
    pub fn evaluate(&self, result: &Classification, tests: &[PointAnnotation]) -> Evaluation {
        let settings = EvaluationSettings {
            class_count: result.class_count,
            sentinel: self.params.sentinel,
            remap: &self.params.label_remap,
            windowed: self.params.windowed_evaluation,
        };
        evaluate(&result.label_map, tests, &settings)
    }

    /// Serializable digest of a run and its optional evaluation.
    pub fn report(
        &self,
        result: &Classification,
        evaluation: Option<&Evaluation>,
    ) -> ClassificationReport {
        let d = degrees(&result.affinity);
        let n = result.affinity.nrows();
        let weighted_pairs = (0..n)
            .flat_map(|j| (0..j).map(move |i| (i, j)))
            .filter(|&(i, j)| result.affinity[(i, j)] > 0.0)
            .count();
        let mut regions_per_class = vec![0usize; result.class_count];
        for &label in &result.region_labels {
            if let Some(slot) = regions_per_class.get_mut(label as usize - 1) {
                *slot += 1;
            }
        }
        let (beta_f, alpha_f) = self.params.propagation_weights();
        ClassificationReport {
            input: result.input.clone(),
            graph: GraphStage {
                regions: result.regions.len(),
                adjacency_edges: result.adjacency.edge_count(),
                isolated_regions: result.adjacency.isolated().collect(),
                weighted_pairs,
                min_degree: if n > 0 { d.min() } else { 0.0 },
                max_degree: if n > 0 { d.max() } else { 0.0 },
            },
            propagation: PropagationStage {
                classes: result.class_count,
                beta_f,
                alpha_f,
                labeled_regions: result.labeled_regions,
                annotations: result.label_drops,
                regions_per_class,
            },
            accuracy: evaluation.map(Evaluation::summary),
            timings: result.timings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LgcError;
    use crate::metric::DistanceMetricKind;

    const S: u32 = 1000;

    /// Three columns of regions: 0 | 1 | 2, with feature values 0, 0.1, 5.
    fn scene() -> (Partition, FeatureField) {
        let rows: Vec<Vec<u32>> = (0..4).map(|_| vec![0, 0, 1, 1, 2, 2]).collect();
        let partition = Partition::from_rows(&rows).unwrap();
        let mut features = FeatureField::new(6, 4, 1).unwrap();
        for y in 0..4 {
            for x in 0..6 {
                features.pixel_mut(x, y)[0] = [0.0, 0.0, 0.1, 0.1, 5.0, 5.0][x];
            }
        }
        (partition, features)
    }

    fn params() -> ClassifierParams {
        ClassifierParams {
            sentinel: S,
            mu: 1.0,
            beta: 1.0,
            ..ClassifierParams::default()
        }
    }

    #[test]
    fn unlabeled_region_follows_similar_neighbor() {
        let (partition, features) = scene();
        let train = [
            PointAnnotation::labeled(1, 0, 0),
            PointAnnotation::labeled(2, 5, 3),
        ];
        let classifier = LgcClassifier::new(params());
        let result = classifier.classify(&partition, &features, &train).unwrap();
        assert_eq!(result.class_count, 2);
        assert_eq!(result.region_labels, vec![1, 1, 2]);
        assert_eq!(result.label_map.get(3, 2), 1);
        assert_eq!(result.training_map.get(2, 0), 0);
        assert_eq!(result.training_map.get(4, 0), 2);
        assert_eq!(result.affinity, result.affinity.transpose());
        assert!(result.timings.stage_ms("propagate").is_some());

        let report = classifier.report(&result, None);
        assert_eq!(report.graph.regions, 3);
        assert_eq!(report.graph.adjacency_edges, 2);
        assert_eq!(report.propagation.regions_per_class, vec![2, 1]);
    }

    #[test]
    fn invalid_params_fail_before_work() {
        let (partition, features) = scene();
        let classifier = LgcClassifier::new(ClassifierParams {
            beta: 1.5,
            ..params()
        });
        assert!(matches!(
            classifier.classify(&partition, &features, &[]),
            Err(LgcError::Configuration(_))
        ));
        let coherence = LgcClassifier::new(ClassifierParams {
            metric: DistanceMetricKind::ComplexCoherence,
            ..params()
        });
        assert!(matches!(
            coherence.classify(&partition, &features, &[]),
            Err(LgcError::Configuration(_))
        ));
    }

    #[test]
    fn uninferable_class_count_fails_before_heavy_stages() {
        // all-zero coherence samples would fail in the affinity stage
        let partition = Partition::from_rows(&[vec![0, 1]]).unwrap();
        let features = FeatureField::new(2, 1, 4).unwrap();
        let classifier = LgcClassifier::new(ClassifierParams {
            metric: DistanceMetricKind::ComplexCoherence,
            ..params()
        });
        match classifier.classify(&partition, &features, &[]) {
            Err(LgcError::Configuration(msg)) => assert!(msg.contains("class count"), "{msg}"),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn channel_free_feature_field_is_rejected() {
        let partition = Partition::from_rows(&[vec![0, 1]]).unwrap();
        let features = FeatureField {
            w: 2,
            h: 1,
            channels: 0,
            data: Vec::new(),
        };
        let classifier = LgcClassifier::new(ClassifierParams {
            normalize_features: true,
            ..params()
        });
        let train = [PointAnnotation::labeled(1, 0, 0)];
        assert!(matches!(
            classifier.classify(&partition, &features, &train),
            Err(LgcError::DataShape(_))
        ));
    }

    #[test]
    fn external_adjacency_must_cover_all_regions() {
        let (partition, features) = scene();
        let adjacency = RegionAdjacency::from_edges(2, S, [(0, 1)]).unwrap();
        let train = [PointAnnotation::labeled(1, 0, 0)];
        let classifier = LgcClassifier::new(params());
        assert!(matches!(
            classifier.classify_with_adjacency(&partition, &features, &adjacency, &train),
            Err(LgcError::DataShape(_))
        ));
    }

    #[test]
    fn evaluation_uses_configured_remap() {
        let (partition, features) = scene();
        let train = [
            PointAnnotation::labeled(1, 0, 0),
            PointAnnotation::labeled(2, 5, 3),
        ];
        let classifier = LgcClassifier::new(ClassifierParams {
            windowed_evaluation: false,
            ..params()
        });
        let result = classifier.classify(&partition, &features, &train).unwrap();
        let tests = [
            PointAnnotation::labeled(1, 2, 1),
            PointAnnotation::labeled(2, 4, 1),
            PointAnnotation::labeled(2, 1, 1),
        ];
        let eval = classifier.evaluate(&result, &tests);
        assert_eq!(eval.confusion.rows(), vec![vec![1, 0], vec![1, 1]]);
        let report = classifier.report(&result, Some(&eval));
        assert_eq!(report.accuracy.map(|a| a.samples), Some(3));
    }
}
