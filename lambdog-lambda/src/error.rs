//! Lambda adapter error types.

use thiserror::Error;

/// Result type for Lambda operations.
pub type Result<T> = std::result::Result<T, LambdaError>;

/// Lambda adapter errors.
#[derive(Debug, Error)]
pub enum LambdaError {
    /// Request conversion error.
    #[error("Request conversion error: {0}")]
    Request(String),

    /// Response conversion error.
    #[error("Response conversion error: {0}")]
    Response(String),

    /// Error raised by the wrapped handler core.
    #[error(transparent)]
    Core(#[from] lambdog_core::Error),

    /// Lambda runtime error.
    #[error("Lambda runtime error: {0}")]
    Runtime(String),
}

impl From<lambda_runtime::Error> for LambdaError {
    fn from(err: lambda_runtime::Error) -> Self {
        Self::Runtime(err.to_string())
    }
}
