use super::TimingBreakdown;
use crate::evaluation::AccuracySummary;
use crate::propagation::AnnotationDrops;
use serde::Serialize;

/// Everything a classification run reports besides the label maps.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationReport {
    pub input: InputDescriptor,
    pub graph: GraphStage,
    pub propagation: PropagationStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<AccuracySummary>,
    pub timings: TimingBreakdown,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub masked_pixels: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStage {
    pub regions: usize,
    pub adjacency_edges: usize,
    pub isolated_regions: Vec<usize>,
    /// Unordered region pairs with positive affinity.
    pub weighted_pairs: usize,
    pub min_degree: f64,
    pub max_degree: f64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropagationStage {
    pub classes: usize,
    pub beta_f: f64,
    pub alpha_f: f64,
    pub labeled_regions: usize,
    pub annotations: AnnotationDrops,
    /// Regions decoded to each class, index 0 for class 1.
    pub regions_per_class: Vec<usize>,
}

impl ClassificationReport {
    /// Short multi-line text summary for terminal output.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "input {}x{}x{} ({} masked px)",
                self.input.width, self.input.height, self.input.channels, self.input.masked_pixels
            ),
            format!(
                "graph: {} regions, {} adjacency edges, {} weighted pairs, degree {:.3e}..{:.3e}",
                self.graph.regions,
                self.graph.adjacency_edges,
                self.graph.weighted_pairs,
                self.graph.min_degree,
                self.graph.max_degree
            ),
            format!(
                "propagation: {} classes, {} labeled regions, beta_f={:.4}, regions/class {:?}",
                self.propagation.classes,
                self.propagation.labeled_regions,
                self.propagation.beta_f,
                self.propagation.regions_per_class
            ),
        ];
        if let Some(acc) = &self.accuracy {
            lines.push(format!(
                "accuracy: OA={:.4} kappa={:.4} over {} points ({} dropped)",
                acc.overall_accuracy,
                acc.kappa,
                acc.samples,
                acc.drops.dropped()
            ));
        }
        lines.push(format!("total {:.2} ms", self.timings.total_ms));
        lines
    }
}
