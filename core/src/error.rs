//! Error types and handling for toolbridge core

use thiserror::Error;

/// Result type alias for toolbridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for toolbridge core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tool execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Health probe failed while a healthy server was required
    #[error("Server at {endpoint} is not reachable or unhealthy")]
    Connection { endpoint: String },

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    /// The retry budget ran out; `detail` is the last observed failure
    #[error("Failed to execute tool '{tool}' after {attempts} attempts: {detail}")]
    ExecutionFailed {
        tool: String,
        attempts: u32,
        detail: String,
    },

    #[error("Invalid tool request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid tool parameters: {message}")]
    InvalidParameters { message: String },
}

impl Error {
    /// True when this is a [`ToolError::ExecutionFailed`]
    pub fn is_execution_failure(&self) -> bool {
        matches!(self, Error::Tool(ToolError::ExecutionFailed { .. }))
    }
}
