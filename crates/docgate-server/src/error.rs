//! Error responses

use crate::services::IngestError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docgate_core::CoreError;
use docgate_types::ApiResponse;

/// Status code plus the `{"status":"error","message":...}` body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::error(self.message))).into_response()
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        let status = match &e {
            IngestError::InvalidJson(_) | IngestError::KvWrite(_) | IngestError::Field(_) => {
                StatusCode::BAD_REQUEST
            }
            IngestError::Sql(_) | IngestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::ReadOnly => Self::new(StatusCode::BAD_REQUEST, e.to_string()),
            _ => Self::internal(e.to_string()),
        }
    }
}
