//! HTTP handlers

pub mod bill;
pub mod health;

pub use health::{health, welcome};
