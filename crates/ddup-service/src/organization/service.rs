//! Organization use cases.
//!
//! Every mutation first checks the caller's current role through the
//! [`RbacResolver`], using the authenticated identity from the request
//! context.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use ddup_auth::RbacResolver;
use ddup_core::error::AppError;
use ddup_core::types::{OrganizationId, UserId};
use ddup_database::{OrganizationStore, UserStore};
use ddup_entity::organization::model::validate_name;
use ddup_entity::organization::{
    NewOrganization, OrgRole, Organization, OrganizationMember, UpdateOrganization,
};

use crate::context::RequestContext;

/// Data for creating an organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateOrganizationRequest {
    /// URL-safe slug.
    pub name: String,
    /// Human-readable name; defaults to the slug.
    pub display_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Website.
    pub website: Option<String>,
}

/// Organization and membership operations.
#[derive(Debug, Clone)]
pub struct OrganizationService {
    /// Organization store.
    organizations: Arc<dyn OrganizationStore>,
    /// User store, for membership targets.
    users: Arc<dyn UserStore>,
    /// Role checks.
    rbac: Arc<RbacResolver>,
}

impl OrganizationService {
    /// Creates a new organization service.
    pub fn new(
        organizations: Arc<dyn OrganizationStore>,
        users: Arc<dyn UserStore>,
        rbac: Arc<RbacResolver>,
    ) -> Self {
        Self {
            organizations,
            users,
            rbac,
        }
    }

    /// Creates an organization with the caller as its first admin.
    ///
    /// The organization and the admin membership are written atomically.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateOrganizationRequest,
    ) -> Result<Organization, AppError> {
        let name = req.name.trim().to_string();
        validate_name(&name)?;

        let mut new = NewOrganization::new(name, ctx.user_id);
        if let Some(display_name) = req.display_name.filter(|d| !d.trim().is_empty()) {
            new.display_name = display_name;
        }
        new.description = req.description;
        new.email = req.email;
        new.website = req.website;

        let org = self.organizations.create_with_admin(new).await?;
        info!(org_id = %org.id, user_id = %ctx.user_id, name = %org.name, "Organization created");
        Ok(org)
    }

    /// `RequireRole`: fails with `Forbidden` below `minimum`, `NotFound` for
    /// non-members.
    pub async fn require_role(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
        minimum: OrgRole,
    ) -> Result<(), AppError> {
        self.rbac.require_role(org_id, user_id, minimum).await?;
        Ok(())
    }

    /// Reads an organization. Members only.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        org_id: OrganizationId,
    ) -> Result<Organization, AppError> {
        self.rbac
            .require_role(org_id, ctx.user_id, OrgRole::Member)
            .await?;
        self.load(org_id).await
    }

    /// Organizations the caller belongs to.
    pub async fn list_mine(&self, ctx: &RequestContext) -> Result<Vec<Organization>, AppError> {
        self.organizations.list_for_user(ctx.user_id).await
    }

    /// Updates descriptive fields or renames. Admins only.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        org_id: OrganizationId,
        mut update: UpdateOrganization,
    ) -> Result<Organization, AppError> {
        self.rbac
            .require_role(org_id, ctx.user_id, OrgRole::Admin)
            .await?;

        if let Some(name) = update.name.as_mut() {
            *name = name.trim().to_string();
            validate_name(name)?;
        }
        if update.is_empty() {
            return self.load(org_id).await;
        }

        let org = self.organizations.update(org_id, &update).await?;
        info!(org_id = %org_id, user_id = %ctx.user_id, "Organization updated");
        Ok(org)
    }

    /// Deletes an organization with its memberships. Admins only.
    pub async fn delete(&self, ctx: &RequestContext, org_id: OrganizationId) -> Result<(), AppError> {
        self.rbac
            .require_role(org_id, ctx.user_id, OrgRole::Admin)
            .await?;

        if !self.organizations.delete(org_id).await? {
            return Err(AppError::not_found(format!("Organization {org_id} not found")));
        }
        info!(org_id = %org_id, user_id = %ctx.user_id, "Organization deleted");
        Ok(())
    }

    /// Lists members. Members only.
    pub async fn list_members(
        &self,
        ctx: &RequestContext,
        org_id: OrganizationId,
    ) -> Result<Vec<OrganizationMember>, AppError> {
        self.rbac
            .require_role(org_id, ctx.user_id, OrgRole::Member)
            .await?;
        self.organizations.list_members(org_id).await
    }

    /// Adds an existing user. Admins only.
    pub async fn add_member(
        &self,
        ctx: &RequestContext,
        org_id: OrganizationId,
        user_id: UserId,
        role: OrgRole,
    ) -> Result<OrganizationMember, AppError> {
        self.rbac
            .require_role(org_id, ctx.user_id, OrgRole::Admin)
            .await?;

        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }

        let member = self.organizations.add_member(org_id, user_id, role).await?;
        info!(org_id = %org_id, user_id = %user_id, role = %role, "Member added");
        Ok(member)
    }

    /// Changes a member's role. Admins only; the last admin cannot be
    /// demoted.
    pub async fn update_member_role(
        &self,
        ctx: &RequestContext,
        org_id: OrganizationId,
        user_id: UserId,
        role: OrgRole,
    ) -> Result<OrganizationMember, AppError> {
        self.rbac
            .require_role(org_id, ctx.user_id, OrgRole::Admin)
            .await?;

        let member = self
            .organizations
            .update_member_role(org_id, user_id, role)
            .await?;
        info!(org_id = %org_id, user_id = %user_id, role = %role, "Member role changed");
        Ok(member)
    }

    /// Removes a member. Admins may remove anyone; members may remove
    /// themselves. The last admin cannot be removed.
    pub async fn remove_member(
        &self,
        ctx: &RequestContext,
        org_id: OrganizationId,
        user_id: UserId,
    ) -> Result<(), AppError> {
        let required = if ctx.user_id == user_id {
            OrgRole::Member
        } else {
            OrgRole::Admin
        };
        self.rbac.require_role(org_id, ctx.user_id, required).await?;

        self.organizations.remove_member(org_id, user_id).await?;
        info!(org_id = %org_id, user_id = %user_id, removed_by = %ctx.user_id, "Member removed");
        Ok(())
    }

    async fn load(&self, org_id: OrganizationId) -> Result<Organization, AppError> {
        self.organizations
            .find_by_id(org_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Organization {org_id} not found")))
    }
}
