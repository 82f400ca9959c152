//! # ddup-core
//!
//! Core crate for the DDUP identity backend. Contains the configuration
//! schema, typed identifiers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DDUP crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
