//! docgate types - pure data definitions shared by the gateway crates
//!
//! Nothing in here touches a store or a runtime; it only knows how an incoming
//! bill document is shaped and what the HTTP bodies look like.

pub mod bill;
pub mod response;

pub use bill::*;
pub use response::*;
