//! End-to-end classifier wiring the region, graph and propagation stages.

pub mod pipeline;

pub use pipeline::{Classification, LgcClassifier};
