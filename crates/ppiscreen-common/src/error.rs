use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PpiScreenError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Empty feature set: variance threshold {threshold} removed all {columns} columns")]
    EmptyFeatureSet { columns: usize, threshold: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PpiScreenError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PpiScreenError>;
