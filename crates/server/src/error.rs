//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("link expired")]
    LinkExpired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("object store timed out")]
    GatewayTimeout,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("gateway error: {0}")]
    Gateway(#[from] vitrine_storage::GatewayError),

    #[error("core error: {0}")]
    Core(#[from] vitrine_core::Error),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::LinkExpired => "link_expired",
            Self::InvalidSignature => "invalid_signature",
            Self::UnsupportedContentType(_) => "unsupported_content_type",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::GatewayTimeout => "gateway_timeout",
            Self::Internal(_) => "internal_error",
            Self::Gateway(_) => "gateway_error",
            Self::Core(_) => "core_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::LinkExpired => StatusCode::GONE,
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::UnsupportedContentType(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Gateway(e) => match e {
                vitrine_storage::GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Core(e) => match e {
                // The upstream object claimed to be a playlist but did not parse.
                vitrine_core::Error::PlaylistParse(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_error_classes() {
        assert_eq!(ApiError::LinkExpired.status_code(), StatusCode::GONE);
        assert_eq!(
            ApiError::InvalidSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::UnsupportedContentType("text/html".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::GatewayTimeout.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ApiError::Gateway(vitrine_storage::GatewayError::NotFound("k".to_string()))
                .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Gateway(vitrine_storage::GatewayError::Presign("cap".to_string()))
                .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Core(vitrine_core::Error::PlaylistParse("no header".to_string()))
                .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ApiError::LinkExpired.code(), "link_expired");
        assert_eq!(ApiError::InvalidSignature.code(), "invalid_signature");
        assert_eq!(ApiError::MethodNotAllowed.code(), "method_not_allowed");
    }
}
