//! Raster containers consumed and produced by the classifier.
//!
//! - [`LabelGrid`]: integer raster used for the input partition and for the
//!   predicted / training / ground-truth label maps.
//! - [`FeatureField`]: per-pixel real feature vectors aligned to a partition.

pub mod features;
pub mod io;
pub mod labels;
pub mod traits;

pub use self::features::FeatureField;
pub use self::labels::{LabelGrid, LabelMap, Partition};
pub use self::traits::{ImageView, Rows};
