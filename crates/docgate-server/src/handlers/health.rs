//! Liveness routes

use crate::AppState;
use axum::{extract::State, Json};
use docgate_types::{HealthResponse, Reachability};

pub async fn welcome() -> &'static str {
    "Welcome to the docgate API server!"
}

/// Always 200 while the process serves; reports relational reachability in the body
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let relational = match state.sql.ping().await {
        Ok(()) => Reachability::Ok,
        Err(e) => {
            tracing::warn!("Relational store ping failed: {}", e);
            Reachability::Unavailable
        }
    };

    // sled counts entries by walking the tree
    let kv = state.kv.clone();
    let documents = match tokio::task::spawn_blocking(move || kv.len()).await {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!("KV count task failed: {}", e);
            0
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        documents,
        relational,
    })
}
