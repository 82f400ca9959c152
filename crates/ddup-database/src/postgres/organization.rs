//! Organization and membership store backed by PostgreSQL.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use ddup_core::error::AppError;
use ddup_core::result::AppResult;
use ddup_core::types::{OrganizationId, UserId};
use ddup_entity::organization::{
    NewOrganization, OrgRole, Organization, OrganizationMember, UpdateOrganization,
};

use super::{db_error, is_foreign_key_violation, is_unique_violation};
use crate::store::{OrganizationStore, guard_last_admin};

/// PostgreSQL organization store.
#[derive(Debug, Clone)]
pub struct PgOrganizationStore {
    pool: PgPool,
}

impl PgOrganizationStore {
    /// Create a new organization store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock every membership row of the organization and return them.
    async fn lock_members(
        tx: &mut Transaction<'_, Postgres>,
        org_id: OrganizationId,
    ) -> AppResult<Vec<OrganizationMember>> {
        sqlx::query_as::<_, OrganizationMember>(
            "SELECT * FROM organization_members WHERE organization_id = $1 FOR UPDATE",
        )
        .bind(org_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(db_error("Failed to lock organization members"))
    }
}

#[async_trait]
impl OrganizationStore for PgOrganizationStore {
    async fn create_with_admin(&self, org: NewOrganization) -> AppResult<Organization> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let created = sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (name, display_name, description, email, website, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&org.name)
        .bind(&org.display_name)
        .bind(&org.description)
        .bind(&org.email)
        .bind(&org.website)
        .bind(org.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!("Organization name '{}' is already taken", org.name))
            } else {
                db_error("Failed to create organization")(e)
            }
        })?;

        sqlx::query(
            "INSERT INTO organization_members (organization_id, user_id, role) VALUES ($1, $2, $3)",
        )
        .bind(created.id)
        .bind(org.created_by)
        .bind(OrgRole::Admin)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert creator membership"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit organization creation"))?;
        Ok(created)
    }

    async fn find_by_id(&self, id: OrganizationId) -> AppResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find organization"))
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Organization>> {
        sqlx::query_as::<_, Organization>(
            "SELECT o.* FROM organizations o \
             JOIN organization_members m ON m.organization_id = o.id \
             WHERE m.user_id = $1 ORDER BY o.name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list organizations"))
    }

    async fn update(
        &self,
        id: OrganizationId,
        update: &UpdateOrganization,
    ) -> AppResult<Organization> {
        let updated = sqlx::query_as::<_, Organization>(
            "UPDATE organizations SET \
                name = COALESCE($2, name), \
                display_name = COALESCE($3, display_name), \
                description = COALESCE($4, description), \
                email = COALESCE($5, email), \
                website = COALESCE($6, website), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.display_name)
        .bind(&update.description)
        .bind(&update.email)
        .bind(&update.website)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("Organization name is already taken")
            } else {
                db_error("Failed to update organization")(e)
            }
        })?;

        updated.ok_or_else(|| AppError::not_found(format!("Organization {id} not found")))
    }

    async fn delete(&self, id: OrganizationId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete organization"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_member(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<OrganizationMember>> {
        sqlx::query_as::<_, OrganizationMember>(
            "SELECT * FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(org_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find membership"))
    }

    async fn list_members(&self, org_id: OrganizationId) -> AppResult<Vec<OrganizationMember>> {
        sqlx::query_as::<_, OrganizationMember>(
            "SELECT * FROM organization_members WHERE organization_id = $1 \
             ORDER BY role DESC, user_id",
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list members"))
    }

    async fn add_member(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
        role: OrgRole,
    ) -> AppResult<OrganizationMember> {
        sqlx::query_as::<_, OrganizationMember>(
            "INSERT INTO organization_members (organization_id, user_id, role) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(org_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict(format!("User {user_id} is already a member"))
            } else if is_foreign_key_violation(&e) {
                AppError::not_found("Organization or user not found")
            } else {
                db_error("Failed to add member")(e)
            }
        })
    }

    async fn update_member_role(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
        role: OrgRole,
    ) -> AppResult<OrganizationMember> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let members = Self::lock_members(&mut tx, org_id).await?;
        if role != OrgRole::Admin {
            guard_last_admin(&members, user_id)?;
        } else if !members.iter().any(|m| m.user_id == user_id) {
            return Err(AppError::not_found(format!(
                "User {user_id} is not a member of this organization"
            )));
        }

        let updated = sqlx::query_as::<_, OrganizationMember>(
            "UPDATE organization_members SET role = $3, updated_at = NOW() \
             WHERE organization_id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(org_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to update member role"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit role update"))?;
        Ok(updated)
    }

    async fn remove_member(&self, org_id: OrganizationId, user_id: UserId) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let members = Self::lock_members(&mut tx, org_id).await?;
        guard_last_admin(&members, user_id)?;

        sqlx::query("DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2")
            .bind(org_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to remove member"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit member removal"))?;
        Ok(())
    }
}
