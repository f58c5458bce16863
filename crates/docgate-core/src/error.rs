//! Error types for docgate core

use thiserror::Error;

/// Main error type for the core crate
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("KV store error: {0}")]
    Kv(#[from] sled::Error),

    #[error("KV store is open read-only")]
    ReadOnly,

    #[error("Value for key '{0}' is not valid UTF-8")]
    InvalidUtf8(String),

    #[error("Invalid array item '{0}'")]
    Codec(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
