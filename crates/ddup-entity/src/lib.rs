//! # ddup-entity
//!
//! Persisted records for the DDUP identity backend. Every struct in this
//! crate represents a database table row or a creation payload. Row types
//! derive `sqlx::FromRow`; creation payloads are built through explicit
//! constructors that fill defaults before the store sees them.

pub mod organization;
pub mod session;
pub mod user;
