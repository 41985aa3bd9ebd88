//! ppiscreen-dataset - everything between the raw bioactivity table and the
//! models: loading, labelling, feature views, variance selection, the
//! train/test split and per-column scaling.

pub mod label;
pub mod loader;
pub mod matrix;
pub mod scaler;
pub mod selection;
pub mod split;
pub mod summary;

pub use label::{derive_label, derive_labels};
pub use loader::{Dataset, DatasetLoader};
pub use matrix::FeatureMatrix;
pub use scaler::StandardScaler;
pub use selection::{column_variances, FeatureSelection, VarianceThreshold};
pub use split::{test_size, SplitView, TrainTestSplit};
pub use summary::{ColumnHistogram, DatasetSummary, Histogram};
