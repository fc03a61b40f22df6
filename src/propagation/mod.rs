//! Label propagation over the region graph.
//!
//! - [`labels`]: sparse point annotations → one-hot label matrix `Y`.
//! - [`solver`]: symmetric normalization of `W` and the closed-form LGC solve.
//! - [`decode`]: soft scores `F` → hard region labels → pixel label map.

pub mod decode;
pub mod labels;
pub mod solver;

pub use decode::{broadcast_labels, decode_labels, TIE_REL_EPS};
pub use labels::{init_label_matrix, AnnotationDrops, LabelMatrix, LabelRemapMode};
pub use solver::{degrees, normalize_affinity, propagate, solve_normalized};
