//! Relational store adapter
//!
//! Talks to MySQL/MariaDB in production and SQLite for local runs through
//! sqlx's `Any` driver. The pool is capped at one connection that is never
//! recycled, so the process holds a single connection for its lifetime.

use anyhow::{Context, Result};
use docgate_core::config::is_identifier;
use docgate_core::SqlSettings;
use docgate_types::BillRow;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::time::Duration;

pub struct SqlStore {
    pool: AnyPool,
    table: String,
    insert_sql: String,
}

impl SqlStore {
    pub async fn connect(settings: &SqlSettings) -> Result<Self> {
        if !is_identifier(&settings.table) {
            anyhow::bail!("Invalid table name: {}", settings.table);
        }

        sqlx::any::install_default_drivers();

        tracing::info!("Connecting to relational store ({})", redact(&settings.url));

        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .connect(&settings.url)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to relational store at: {}",
                    redact(&settings.url)
                )
            })?;

        let store = Self {
            pool,
            table: settings.table.clone(),
            insert_sql: format!(
                "INSERT INTO {} (billing_doc_no, billing_date, da_code) VALUES (?, ?, ?)",
                settings.table
            ),
        };

        if settings.auto_migrate {
            tracing::info!("Relational connection established, ensuring table '{}'", store.table);
            store
                .run_migrations()
                .await
                .context("Failed to run database migrations")?;
        }

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<()> {
        // Column types understood by both MySQL and SQLite
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                billing_doc_no VARCHAR(64) NOT NULL,
                billing_date VARCHAR(32) NOT NULL,
                da_code INTEGER NOT NULL
            )
            "#,
            self.table
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Insert one denormalized row as a prepared statement
    pub async fn insert_bill(&self, row: &BillRow) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(&self.insert_sql)
            .bind(row.billing_doc_no.as_str())
            .bind(row.billing_date.as_str())
            .bind(row.da_code)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn ping(&self) -> std::result::Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Rows as text, oldest first
    #[cfg(test)]
    pub async fn rows(&self) -> Vec<(String, String, String)> {
        sqlx::query_as(&format!(
            "SELECT billing_doc_no, billing_date, CAST(da_code AS TEXT) FROM {}",
            self.table
        ))
        .fetch_all(&self.pool)
        .await
        .unwrap()
    }

    #[cfg(test)]
    pub async fn execute_raw(&self, sql: &str) {
        sqlx::query(sql).execute(&self.pool).await.unwrap();
    }
}

/// Strip the password from a connection URL before logging it
fn redact(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    match rest.split_once('@') {
        Some((userinfo, host)) => {
            let user = userinfo.split(':').next().unwrap_or_default();
            format!("{}://{}:***@{}", scheme, user, host)
        }
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_settings;

    #[tokio::test]
    async fn test_insert_bill() {
        let store = SqlStore::connect(&memory_settings(true)).await.unwrap();
        store.ping().await.unwrap();

        let row = BillRow {
            billing_doc_no: "9001".to_string(),
            billing_date: "2025-03-25".to_string(),
            da_code: 42,
        };
        store.insert_bill(&row).await.unwrap();
        store.insert_bill(&row).await.unwrap();

        let rows = store.rows().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            ("9001".to_string(), "2025-03-25".to_string(), "42".to_string())
        );
    }

    #[tokio::test]
    async fn test_insert_without_table_fails() {
        let store = SqlStore::connect(&memory_settings(false)).await.unwrap();

        let row = BillRow {
            billing_doc_no: String::new(),
            billing_date: "2025-03-25".to_string(),
            da_code: 1,
        };
        assert!(store.insert_bill(&row).await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_bad_table_name() {
        let mut settings = memory_settings(true);
        settings.table = "rdl test".to_string();
        assert!(SqlStore::connect(&settings).await.is_err());
    }

    #[test]
    fn test_redact() {
        assert_eq!(
            redact("mysql://root:secret@db:3306/odms"),
            "mysql://root:***@db:3306/odms"
        );
        assert_eq!(redact("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(redact("sqlite://./data/x.db"), "sqlite://./data/x.db");
    }
}
