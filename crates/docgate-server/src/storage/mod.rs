//! Storage layer
//!
//! Documents live in the embedded KV store (`docgate_core::KvStore`); the
//! relational side only receives the denormalized row.

pub mod sql;

pub use docgate_core::KvStore;
pub use sql::SqlStore;
