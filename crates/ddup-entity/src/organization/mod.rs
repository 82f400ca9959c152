//! Organization and membership entities.

pub mod member;
pub mod model;
pub mod role;

pub use member::OrganizationMember;
pub use model::{NewOrganization, Organization, UpdateOrganization};
pub use role::OrgRole;
