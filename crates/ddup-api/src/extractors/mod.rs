//! Custom Axum extractors.

pub mod auth;
pub mod json;

pub use auth::{AuthUser, RawToken};
pub use json::ValidatedJson;
