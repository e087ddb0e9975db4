//! Error types for Tally Core

use thiserror::Error;

/// Result type alias using Tally Error
pub type Result<T> = std::result::Result<T, Error>;

/// Tally error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Tool-call round limit of {0} exceeded")]
    RoundBudget(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Tool-specific errors
///
/// These never escape a tool invocation: the registry folds them into the
/// structured `{"error": ...}` result returned to the model.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}
