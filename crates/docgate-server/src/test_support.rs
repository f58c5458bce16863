//! Shared fixtures for unit tests

use docgate_core::SqlSettings;

/// In-memory SQLite settings; the single pooled connection keeps the database alive
pub fn memory_settings(auto_migrate: bool) -> SqlSettings {
    SqlSettings {
        url: "sqlite::memory:".to_string(),
        table: "rdl_test".to_string(),
        auto_migrate,
        connect_timeout_secs: 5,
    }
}
