//! JSON run configuration for the command-line tools.

pub mod run;

pub use run::{load_config, OutputConfig, RunConfig};
