// API error taxonomy
//
// Maps failures to stable HTTP responses: unknown resources surface as 404
// with a fixed message, missing fields as 400, upstream provider failures as
// 502 with a generic body (raw provider errors are never echoed to callers),
// and anything unexpected as a logged 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("upstream provider failure")]
    Upstream(#[source] anyhow::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation(_) => "invalid_request",
            ApiError::Upstream(_) => "upstream_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    /// Message safe to show the caller. Upstream and internal failures get a
    /// generic body; the underlying error only goes to the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::NotFound(_) | ApiError::Validation(_) => self.to_string(),
            ApiError::Upstream(_) => "upstream provider unavailable".to_string(),
            ApiError::Internal(_) => "internal error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Upstream(source) => {
                tracing::warn!(error = %source, "Upstream provider failure")
            }
            ApiError::Internal(source) => {
                tracing::error!(error = %source, "Request failed")
            }
            _ => {}
        }

        let body = serde_json::json!({
            "error": {
                "message": self.public_message(),
                "type": self.error_type(),
            }
        });

        (self.status(), Json(body)).into_response()
    }
}
