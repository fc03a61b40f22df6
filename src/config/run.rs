use crate::params::ClassifierParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One classification run: inputs, outputs and classifier parameters.
///
/// ```json
/// {
///   "partition": "scene/partition.json",
///   "features": "scene/features.json",
///   "train_labels": "scene/train.csv",
///   "test_labels": "scene/test.csv",
///   "params": { "mu": 0.1, "metric": "complex_coherence", "feature_mode": "stokes_to_coherence" },
///   "output": { "report_json": "out/report.json", "label_map_json": "out/labels.json" }
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct RunConfig {
    /// `{width, height, data}` region ids, row-major.
    pub partition: PathBuf,
    /// `{width, height, channels, data}` pixel-interleaved features.
    pub features: PathBuf,
    /// Optional `[[neighbors of region 0], …]`; derived from the partition when absent.
    #[serde(default)]
    pub adjacency: Option<PathBuf>,
    pub train_labels: PathBuf,
    #[serde(default)]
    pub test_labels: Option<PathBuf>,
    #[serde(default)]
    pub params: ClassifierParams,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub report_json: PathBuf,
    #[serde(default)]
    pub label_map_json: Option<PathBuf>,
    #[serde(default)]
    pub training_map_json: Option<PathBuf>,
    #[serde(default)]
    pub truth_map_json: Option<PathBuf>,
    #[serde(default)]
    pub soft_labels_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<RunConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    parse_config(&data).map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

fn parse_config(data: &str) -> Result<RunConfig, serde_json::Error> {
    serde_json::from_str(data)
}
