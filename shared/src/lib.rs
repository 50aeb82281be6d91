//! Shared types for the order service
//!
//! Domain models, the unified error system, and small utilities used by
//! `order-server` and by anything that speaks its JSON API.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
