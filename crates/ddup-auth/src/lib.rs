//! # ddup-auth
//!
//! Authentication and authorization core for the DDUP identity backend.
//!
//! ## Modules
//!
//! - `password` — Argon2id hashing, verification, and password policy
//! - `jwt` — signed, time-bounded bearer tokens
//! - `session` — the session ledger that makes tokens revocable, plus cleanup
//! - `gatekeeper` — per-request token check producing an [`Identity`]
//! - `rbac` — organization role lookup and role-gated authorization

pub mod gatekeeper;
pub mod jwt;
pub mod password;
pub mod rbac;
pub mod session;

pub use gatekeeper::{Gatekeeper, Identity};
pub use jwt::{Claims, JwtDecoder, JwtEncoder, MintedToken, TokenError};
pub use password::{PasswordError, PasswordHasher, PasswordValidator};
pub use rbac::RbacResolver;
pub use session::{SessionCleanup, SessionLedger};
