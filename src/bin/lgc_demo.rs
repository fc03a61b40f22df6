use serde::Serialize;
use std::env;
use std::path::Path;
use superpixel_lgc::annotations::load_annotations_csv;
use superpixel_lgc::config::load_config;
use superpixel_lgc::diagnostics::ClassificationReport;
use superpixel_lgc::evaluation::Evaluation;
use superpixel_lgc::image::io::{load_json_file, write_json_file};
use superpixel_lgc::image::{FeatureField, Partition};
use superpixel_lgc::regions::{region_count, RegionAdjacency};
use superpixel_lgc::LgcClassifier;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let partition: Partition = load_json_file(&config.partition)?;
    let features: FeatureField = load_json_file(&config.features)?;
    let train = load_annotations_csv(&config.train_labels)?;
    let tests = match &config.test_labels {
        Some(path) => Some(load_annotations_csv(path)?),
        None => None,
    };

    let classifier = LgcClassifier::new(config.params);
    let result = match &config.adjacency {
        Some(path) => {
            let sets: Vec<Vec<u32>> = load_json_file(path)?;
            let sentinel = classifier.params().sentinel;
            let regions = region_count(&partition, sentinel).map_err(|e| e.to_string())?;
            let adjacency = RegionAdjacency::from_neighbor_sets(regions, sentinel, &sets)
                .map_err(|e| e.to_string())?;
            classifier.classify_with_adjacency(&partition, &features, &adjacency, &train)
        }
        None => classifier.classify(&partition, &features, &train),
    }
    .map_err(|e| format!("Classification failed: {e}"))?;

    let evaluation = tests.map(|t| classifier.evaluate(&result, &t));
    let report = classifier.report(&result, evaluation.as_ref());
    print_summary(&report, evaluation.as_ref());

    write_json_file(&config.output.report_json, &report)?;
    println!("JSON report written to {}", config.output.report_json.display());
    if let Some(path) = &config.output.label_map_json {
        write_json_file(path, &result.label_map)?;
        println!("Label map written to {}", path.display());
    }
    if let Some(path) = &config.output.training_map_json {
        write_json_file(path, &result.training_map)?;
        println!("Training map written to {}", path.display());
    }
    if let (Some(path), Some(eval)) = (&config.output.truth_map_json, &evaluation) {
        write_json_file(path, &eval.truth_map)?;
        println!("Truth map written to {}", path.display());
    }
    if let Some(path) = &config.output.soft_labels_json {
        let rows = SoftLabels::from_matrix(&result.soft_labels);
        write_json_file(path, &rows)?;
        println!("Soft labels written to {}", path.display());
    }
    Ok(())
}

fn print_summary(report: &ClassificationReport, evaluation: Option<&Evaluation>) {
    println!("Classification summary");
    for line in report.summary_lines() {
        println!("  {line}");
    }
    for stage in &report.timings.stages {
        println!("  {:<12} {:>9.3} ms", stage.label, stage.elapsed_ms);
    }
    let Some(eval) = evaluation else {
        return;
    };
    println!("Confusion matrix (rows: truth, cols: predicted)");
    for row in eval.confusion.rows() {
        let cells: Vec<String> = row.iter().map(|c| format!("{c:>7}")).collect();
        println!("  {}", cells.join(""));
    }
    for (class, ua) in eval.confusion.user_accuracy().iter().enumerate() {
        match ua {
            Some(v) => println!("  class {}: user accuracy {:.4}", class + 1, v),
            None => println!("  class {}: no test samples", class + 1),
        }
    }
    println!("  overall accuracy: {:.4}", eval.confusion.overall_accuracy());
    println!("  kappa: {:.4}", eval.confusion.kappa());
}

fn usage() -> String {
    "Usage: lgc_demo <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SoftLabels {
    regions: usize,
    classes: usize,
    /// Row-major `regions × classes` scores.
    scores: Vec<Vec<f64>>,
}

impl SoftLabels {
    fn from_matrix(f: &nalgebra::DMatrix<f64>) -> Self {
        Self {
            regions: f.nrows(),
            classes: f.ncols(),
            scores: f
                .row_iter()
                .map(|row| row.iter().copied().collect())
                .collect(),
        }
    }
}
