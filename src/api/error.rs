//! Conversion of application errors into HTTP responses.
//!
//! Every failure is rendered as
//! `{"error": {"code", "message"}, "request_id"}`; server-side failures keep
//! their details in the logs and return a generic message.

use crate::error::AppError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Result type for handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = self.code();
        let request_id = uuid::Uuid::new_v4().to_string();

        let message = if self.is_client_error() {
            tracing::warn!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
            self.to_string()
        } else {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
            "Internal server error".to_string()
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}
