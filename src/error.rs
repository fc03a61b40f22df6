//! Error taxonomy shared by every stage of the classifier.
//!
//! Configuration and shape problems are detected before any heavy work
//! starts. Numerical failures abort the run: the remedy is a parameter or
//! data change, never a retry. Dropped annotations are not errors; they are
//! counted in [`crate::propagation::AnnotationDrops`] and
//! [`crate::evaluation::EvaluationDrops`].

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LgcError {
    /// Invalid parameters, class count or sentinel choice.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Feature field and partition disagree on the image size.
    #[error(
        "feature field is {feature_width}x{feature_height} but partition is {partition_width}x{partition_height}"
    )]
    ShapeMismatch {
        feature_width: usize,
        feature_height: usize,
        partition_width: usize,
        partition_height: usize,
    },

    /// Malformed input buffers, empty regions or unreadable annotation rows.
    #[error("data shape error: {0}")]
    DataShape(String),

    /// A region has no affinity mass and cannot be normalized.
    #[error("region {region} has zero total affinity (degree {degree})")]
    DegenerateGraph { region: usize, degree: f64 },

    /// Non-invertible coherence operand or near-singular propagation system.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}

pub type Result<T> = std::result::Result<T, LgcError>;

impl LgcError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Self::DataShape(msg.into())
    }

    pub(crate) fn numeric(msg: impl Into<String>) -> Self {
        Self::NumericalInstability(msg.into())
    }
}
