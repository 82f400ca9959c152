//! Organization and membership management.

pub mod service;

pub use service::{CreateOrganizationRequest, OrganizationService};
