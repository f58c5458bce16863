//! HTTP response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by the ingest route and by every failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse {
    Success { key: String },
    Error { message: String },
}

impl ApiResponse {
    pub fn success(key: impl Into<String>) -> Self {
        ApiResponse::Success { key: key.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse::Error {
            message: message.into(),
        }
    }
}

/// Relational store reachability as reported by `/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    Ok,
    Unavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Number of documents held by the KV store
    pub documents: usize,
    pub relational: Reachability,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyListResponse {
    pub keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub key: String,
    pub document: Value,
}
