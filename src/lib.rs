#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod annotations;
pub mod classifier;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod evaluation;
pub mod image;
pub mod params;

// Stage modules; public for tools and experiments, considered internals.
pub mod features;
pub mod graph;
pub mod metric;
pub mod propagation;
pub mod regions;

// --- High-level re-exports -------------------------------------------------

// Main entry points: classifier + parameters.
pub use crate::classifier::{Classification, LgcClassifier};
pub use crate::error::{LgcError, Result};
pub use crate::params::{ClassifierParams, DEFAULT_SENTINEL};

// Serializable run digest.
pub use crate::diagnostics::ClassificationReport;
pub use crate::evaluation::{AccuracySummary, Evaluation};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use superpixel_lgc::prelude::*;
///
/// # fn main() -> superpixel_lgc::Result<()> {
/// let partition = Partition::from_rows(&[vec![0, 0, 1, 1], vec![0, 0, 1, 1]])?;
/// let features = FeatureField::from_vec(4, 2, 1, vec![0.0, 0.1, 3.0, 3.1, 0.0, 0.2, 3.2, 3.0])?;
/// let train = [PointAnnotation::labeled(1, 0, 0), PointAnnotation::labeled(2, 3, 1)];
///
/// let classifier = LgcClassifier::new(ClassifierParams {
///     sentinel: 100,
///     ..Default::default()
/// });
/// let result = classifier.classify(&partition, &features, &train)?;
/// println!("region labels: {:?}", result.region_labels);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::annotations::PointAnnotation;
    pub use crate::image::{FeatureField, LabelMap, Partition};
    pub use crate::{ClassifierParams, LgcClassifier};
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    // Stage runners.
    pub use crate::features::{prepare_features, FeatureExtractionMode};
    pub use crate::graph::{AffinityBuilder, NeighborSelectionMode};
    pub use crate::propagation::{
        broadcast_labels, decode_labels, init_label_matrix, normalize_affinity, propagate,
        solve_normalized, LabelMatrix, LabelRemapMode,
    };
    pub use crate::regions::{aggregate_regions, Connectivity, RegionAdjacency, RegionSet};

    // Structured diagnostics types.
    pub use crate::diagnostics::{
        GraphStage, InputDescriptor, PropagationStage, StageTiming, TimingBreakdown,
    };
    pub use crate::evaluation::{evaluate, ConfusionMatrix, EvaluationDrops, EvaluationSettings};
}
