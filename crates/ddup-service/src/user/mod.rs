//! Account registration and self-service.

pub mod service;

pub use service::{RegisterRequest, UserService, validate_username};
