//! ppiscreen-models - potency classifiers, their evaluation, and the
//! pipeline that wires loader, features, split and models together.

pub mod classifier;
pub mod cross_val;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod svc;
pub mod tree;

pub use classifier::{Classifier, ModelKind};
pub use cross_val::{cross_validate, kfold_indices, CrossValidation};
pub use metrics::{roc_curve, ConfusionMatrix, Evaluation, RocCurve, RocPoint};
pub use pipeline::Pipeline;
pub use report::{RunReport, SelectionReport, SplitReport};
pub use runner::{ModelEvaluation, ModelRunner};
pub use svc::LinearSvc;
pub use tree::DecisionTreeClassifier;
