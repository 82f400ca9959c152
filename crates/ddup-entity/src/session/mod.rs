//! Session domain entities.

pub mod model;

pub use model::{NewSession, Session};
