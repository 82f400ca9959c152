//! # ddup-service
//!
//! Use-case layer for the DDUP identity backend. Each service combines the
//! stores from `ddup-database` with the auth components from `ddup-auth`.
//!
//! Services follow constructor injection: every dependency is handed in at
//! construction time as an `Arc`.

pub mod context;
pub mod organization;
pub mod session;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
pub use organization::{CreateOrganizationRequest, OrganizationService};
pub use session::{LoginResult, SessionService};
pub use user::{RegisterRequest, UserService};
