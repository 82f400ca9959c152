//! Organization role-based access control.

pub mod resolver;

pub use resolver::{RbacResolver, require_minimum_role};
