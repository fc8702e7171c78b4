//! Gateway error types.

use thiserror::Error;

/// Object store gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("S3 error: {0}")]
    S3(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("object body is not valid UTF-8: {0}")]
    InvalidBody(String),

    #[error("presign failed: {0}")]
    Presign(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
