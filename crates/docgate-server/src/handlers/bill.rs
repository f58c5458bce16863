//! Bill document handlers

use crate::error::ApiError;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use docgate_types::{ApiResponse, DocumentResponse, KeyListResponse};
use tracing::error;

/// `POST /api/bill`
pub async fn ingest(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse>), ApiError> {
    match state.ingest.ingest(&body).await {
        Ok(key) => Ok((StatusCode::CREATED, Json(ApiResponse::success(key)))),
        Err(e) => {
            error!("Ingest failed: {}", e);
            Err(e.into())
        }
    }
}

/// `GET /api/bill`
pub async fn list(State(state): State<AppState>) -> Result<Json<KeyListResponse>, ApiError> {
    let kv = state.kv.clone();
    let keys = tokio::task::spawn_blocking(move || kv.keys())
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))??;

    Ok(Json(KeyListResponse { keys }))
}

/// `GET /api/bill/:key`
pub async fn get(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let kv = state.kv.clone();
    let lookup = key.clone();
    let document = tokio::task::spawn_blocking(move || kv.get_json(&lookup))
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))??;

    match document {
        Some(document) => Ok(Json(DocumentResponse { key, document })),
        None => Err(ApiError::not_found(format!("Document not found: {}", key))),
    }
}

/// `DELETE /api/bill/:key` - removes the KV entry only; relational rows are kept
pub async fn delete(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    let kv = state.kv.clone();
    tokio::task::spawn_blocking(move || kv.remove(&key))
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))??;

    Ok(StatusCode::NO_CONTENT)
}
