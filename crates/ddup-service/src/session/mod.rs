//! Login, logout, refresh, and request validation.

pub mod service;

pub use service::{LoginResult, SessionService};
