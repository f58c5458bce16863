//! Document ingest: KV write first, then the relational row
//!
//! The two writes are independent. A failed relational insert leaves the
//! document in the KV store.

use crate::storage::{KvStore, SqlStore};
use chrono::Utc;
use docgate_core::CoreError;
use docgate_types::{document_key, fallback_key, BillRow, FieldError};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("KV write failed: {0}")]
    KvWrite(CoreError),

    #[error("Invalid document: {0}")]
    Field(#[from] FieldError),

    #[error("Database error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Server error: {0}")]
    Internal(String),
}

pub struct IngestService {
    kv: KvStore,
    sql: Arc<SqlStore>,
}

impl IngestService {
    pub fn new(kv: KvStore, sql: Arc<SqlStore>) -> Self {
        Self { kv, sql }
    }

    /// Persist one document and its row, returning the key it was stored under
    pub async fn ingest(&self, body: &[u8]) -> Result<String, IngestError> {
        let doc: Value = serde_json::from_slice(body)?;

        let key = document_key(&doc).unwrap_or_else(generate_key);
        debug!("Ingesting document under '{}'", key);

        let kv = self.kv.clone();
        let kv_key = key.clone();
        let doc = tokio::task::spawn_blocking(move || -> docgate_core::Result<Value> {
            kv.put_json(&kv_key, &doc)?;
            Ok(doc)
        })
        .await
        .map_err(|e| IngestError::Internal(e.to_string()))?
        .map_err(IngestError::KvWrite)?;

        let row = BillRow::from_document(&doc).map_err(|e| {
            warn!("Document '{}' stored in KV but not projected: {}", key, e);
            e
        })?;

        self.sql.insert_bill(&row).await.map_err(|e| {
            warn!("Document '{}' stored in KV but row insert failed: {}", key, e);
            e
        })?;

        info!(
            "Stored document '{}' (billing_doc_no={:?}, da_code={})",
            key, row.billing_doc_no, row.da_code
        );
        Ok(key)
    }
}

/// `data_<nanoseconds since the Unix epoch>`
fn generate_key() -> String {
    fallback_key(Utc::now().timestamp_nanos_opt().unwrap_or_default())
}
