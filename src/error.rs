/*
 * Responsibility
 * - The single error type at the HTTP boundary (AppError)
 * - IntoResponse: HTTP status + JSON error body
 * - Auth failures keep their own status / code / message
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::AuthError;

/// `{ "success": false, "error": 401, "code": "invalid_header", "message": "..." }`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("not found")]
    NotFound,
    #[error("request timed out")]
    Timeout,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(err) => err.status(),
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            AppError::Auth(err) => (err.code(), err.description()),
            AppError::NotFound => ("not_found", "Resource not found".into()),
            AppError::Timeout => ("request_timeout", "Request timed out".into()),
            AppError::Internal => ("internal_server_error", "Internal server error".into()),
        };

        let body = ErrorResponse {
            success: false,
            error: status.as_u16(),
            code,
            message,
        };

        (status, Json(body)).into_response()
    }
}
