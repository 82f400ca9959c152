//! Password hashing and policy enforcement.

pub mod hasher;
pub mod validator;

pub use hasher::{PasswordError, PasswordHasher};
pub use validator::PasswordValidator;
