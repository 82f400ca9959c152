//! Role lookup and role-gated authorization inside an organization.

use std::sync::Arc;

use tracing::debug;

use ddup_core::error::AppError;
use ddup_core::result::AppResult;
use ddup_core::types::{OrganizationId, UserId};
use ddup_database::OrganizationStore;
use ddup_entity::organization::OrgRole;

/// Checks that a role meets a minimum. Ordering: member < admin.
pub fn require_minimum_role(actual: OrgRole, minimum: OrgRole) -> AppResult<()> {
    if actual.has_at_least(minimum) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "Role '{actual}' is insufficient; minimum required: '{minimum}'"
        )))
    }
}

/// Resolves roles from storage on every call.
///
/// Roles are never cached or taken from the client; each check reads the
/// current membership.
#[derive(Debug, Clone)]
pub struct RbacResolver {
    /// Membership source.
    organizations: Arc<dyn OrganizationStore>,
}

impl RbacResolver {
    /// Creates a resolver over the organization store.
    pub fn new(organizations: Arc<dyn OrganizationStore>) -> Self {
        Self { organizations }
    }

    /// The user's role in the organization. `NotFound` if not a member.
    pub async fn role_of(&self, org_id: OrganizationId, user_id: UserId) -> AppResult<OrgRole> {
        self.organizations
            .find_member(org_id, user_id)
            .await?
            .map(|m| m.role)
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "User {user_id} is not a member of organization {org_id}"
                ))
            })
    }

    /// Fails with `Forbidden` unless the user holds at least `minimum`.
    ///
    /// Returns the role actually held.
    pub async fn require_role(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
        minimum: OrgRole,
    ) -> AppResult<OrgRole> {
        let role = self.role_of(org_id, user_id).await?;
        require_minimum_role(role, minimum).inspect_err(|_| {
            debug!(
                org_id = %org_id,
                user_id = %user_id,
                role = %role,
                required = %minimum,
                "Role check failed"
            );
        })?;
        Ok(role)
    }
}
