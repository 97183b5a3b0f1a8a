use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::store::StoreError;
use crate::tracing::current_request_id;

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "error": "Product name is required" }))]
pub struct ErrorResponse {
    /// Human-readable error description
    #[schema(example = "Product not found")]
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    MalformedInput(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    StoreFailure(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Wraps a failed store call. The underlying detail is logged and never
    /// reaches the response body; only `context` does.
    pub fn from_store(err: StoreError, context: impl Into<String>) -> Self {
        let context = context.into();
        match err {
            StoreError::Unauthorized(detail) => {
                error!(
                    error = %detail,
                    context = %context,
                    request_id = ?current_request_id(),
                    "Store rejected credentials"
                );
                ServiceError::Unauthorized("Unauthorized".to_string())
            }
            other => {
                error!(
                    error = %other,
                    context = %context,
                    request_id = ?current_request_id(),
                    "Store call failed"
                );
                ServiceError::StoreFailure(context)
            }
        }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedInput(_) | Self::ValidationError(_) | Self::InvalidIdentifier(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::StoreFailure(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.response_message(),
        };

        (status, Json(body)).into_response()
    }
}
