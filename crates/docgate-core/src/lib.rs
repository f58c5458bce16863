//! docgate core
//!
//! The embedded key-value adapter, its integer-array codec and the layered
//! gateway settings.

pub mod codec;
pub mod config;
pub mod error;
pub mod kv;

pub use self::config::{KvSettings, LogSettings, ServerSettings, Settings, SqlSettings};
pub use error::{CoreError, Result};
pub use kv::KvStore;
