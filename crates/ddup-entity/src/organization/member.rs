//! Organization membership model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use ddup_core::types::{OrganizationId, UserId};

use super::role::OrgRole;

/// The (organization, user) link carrying the user's role.
///
/// A pair appears at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrganizationMember {
    /// Organization side of the link.
    pub organization_id: OrganizationId,
    /// User side of the link.
    pub user_id: UserId,
    /// Role inside the organization.
    pub role: OrgRole,
    /// When the membership was created.
    pub created_at: DateTime<Utc>,
    /// When the role last changed.
    pub updated_at: DateTime<Utc>,
}

impl OrganizationMember {
    /// Whether this member administers the organization.
    pub fn is_admin(&self) -> bool {
        self.role == OrgRole::Admin
    }
}
