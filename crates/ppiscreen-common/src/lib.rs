//! ppiscreen-common - Shared types, errors, and configuration used across all ppiscreen crates.

pub mod error;
pub mod entities;
pub mod pipeline_config;

// Re-export commonly used types
pub use error::{PpiScreenError, Result};
pub use entities::{MoleculeRecord, PotencyLabel};
pub use pipeline_config::{
    ColumnMapping, FingerprintConfig, InputConfig, LabelConfig, ModelsConfig, OutputConfig,
    PipelineConfig, SelectionConfig, SplitConfig, SvcConfig, TreeConfig,
};
