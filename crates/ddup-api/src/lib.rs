//! # ddup-api
//!
//! HTTP API layer for DDUP built on Axum.
//!
//! Provides the REST endpoints for authentication, accounts, and
//! organizations, together with the request extractors, DTOs, CORS and
//! logging middleware, and the mapping from [`ddup_core::AppError`] to HTTP
//! responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
