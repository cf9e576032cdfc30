//! Error types for viva

use thiserror::Error;

use crate::eval::ParseError;
use crate::providers::ProviderError;

/// Result type alias using VivaError
pub type Result<T> = std::result::Result<T, VivaError>;

/// Error type alias for convenience
pub type Error = VivaError;

/// Main error type for viva
#[derive(Debug, Error)]
pub enum VivaError {
    /// Every enabled provider was attempted and none produced a complete result.
    #[error("All AI services failed")]
    AllProvidersFailed,

    /// The caller's wall-clock budget elapsed before the evaluation finished.
    #[error("Evaluation timed out after {0}s")]
    EvaluationTimeout(u64),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}
