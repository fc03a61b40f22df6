//! Serializable diagnostics returned alongside a classification.
//!
//! `ClassificationReport` is the entry point: input dimensions, graph
//! statistics, annotation bookkeeping, optional accuracy figures and the
//! per-stage timing breakdown.

pub mod report;
pub mod timing;

pub use report::{ClassificationReport, GraphStage, InputDescriptor, PropagationStage};
pub use timing::{StageTiming, TimingBreakdown};
