//! Capability traits the identity core requires from storage.
//!
//! Each trait has a PostgreSQL implementation ([`crate::postgres`]) and an
//! in-memory implementation ([`crate::memory`]). Multi-step operations are
//! atomic within one implementation: a transaction for PostgreSQL, a single
//! lock acquisition for memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ddup_core::error::AppError;
use ddup_core::result::AppResult;
use ddup_core::types::{OrganizationId, SessionId, UserId};
use ddup_entity::organization::{
    NewOrganization, OrgRole, Organization, OrganizationMember, UpdateOrganization,
};
use ddup_entity::session::{NewSession, Session};
use ddup_entity::user::{NewUser, User, UserStatus};

/// User persistence.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug {
    /// Insert a user. A taken username (case-insensitive) is a `Conflict`.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Find a user by primary key.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by username (case-insensitive).
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Replace the stored password hash. `NotFound` if the user is absent.
    async fn update_password(&self, id: UserId, password_hash: &str) -> AppResult<()>;

    /// Record a successful login.
    async fn update_last_login(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()>;

    /// Change the lifecycle status. `NotFound` if the user is absent.
    async fn update_status(&self, id: UserId, status: UserStatus) -> AppResult<()>;
}

/// Session ledger persistence.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Atomically invalidate every valid session of `session.user_id` and
    /// insert `session` as the only valid one.
    async fn replace_for_user(&self, session: NewSession) -> AppResult<Session>;

    /// Find a session by token fingerprint, valid or not.
    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<Session>>;

    /// Invalidate the session with this fingerprint.
    ///
    /// Returns `true` if a valid row was flipped. Unknown or already invalid
    /// rows are not an error.
    async fn invalidate_by_token_hash(&self, token_hash: &str) -> AppResult<bool>;

    /// Invalidate a session by id if it is still valid.
    async fn invalidate(&self, id: SessionId) -> AppResult<bool>;

    /// Atomically swap a still-valid session for a new one.
    ///
    /// Returns `None`, changing nothing, when no valid row carries
    /// `old_token_hash`. Otherwise every valid session of the user is
    /// invalidated and `session` is inserted.
    async fn rotate(
        &self,
        old_token_hash: &str,
        session: NewSession,
    ) -> AppResult<Option<Session>>;

    /// Delete rows that are invalid or expired and older than `before`.
    async fn purge_stale(&self, before: DateTime<Utc>) -> AppResult<u64>;

    /// Reachability check for the liveness probe.
    async fn ping(&self) -> AppResult<()>;
}

/// Organization and membership persistence.
#[async_trait]
pub trait OrganizationStore: Send + Sync + std::fmt::Debug {
    /// Insert an organization and an admin membership for its creator in one
    /// atomic step. A taken name is a `Conflict`.
    async fn create_with_admin(&self, org: NewOrganization) -> AppResult<Organization>;

    /// Find an organization by primary key.
    async fn find_by_id(&self, id: OrganizationId) -> AppResult<Option<Organization>>;

    /// Organizations the user belongs to, ordered by name.
    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Organization>>;

    /// Apply a partial update. `NotFound` if absent, `Conflict` on a taken name.
    async fn update(
        &self,
        id: OrganizationId,
        update: &UpdateOrganization,
    ) -> AppResult<Organization>;

    /// Delete an organization and its memberships. Returns `false` if absent.
    async fn delete(&self, id: OrganizationId) -> AppResult<bool>;

    /// Look up one membership.
    async fn find_member(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<OrganizationMember>>;

    /// All memberships of an organization, admins first.
    async fn list_members(&self, org_id: OrganizationId) -> AppResult<Vec<OrganizationMember>>;

    /// Add a membership. `Conflict` if the pair already exists.
    async fn add_member(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
        role: OrgRole,
    ) -> AppResult<OrganizationMember>;

    /// Change a member's role. `NotFound` if absent; `Forbidden` when it
    /// would demote the organization's last admin.
    async fn update_member_role(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
        role: OrgRole,
    ) -> AppResult<OrganizationMember>;

    /// Remove a membership. `NotFound` if absent; `Forbidden` when it would
    /// remove the organization's last admin.
    async fn remove_member(&self, org_id: OrganizationId, user_id: UserId) -> AppResult<()>;
}

/// Message used whenever a change would leave an organization without admins.
pub const LAST_ADMIN_MESSAGE: &str = "An organization must keep at least one admin";

/// Reject a change that takes admin away from `user_id` when they are the
/// only admin left.
pub(crate) fn guard_last_admin(members: &[OrganizationMember], user_id: UserId) -> AppResult<()> {
    let target = members.iter().find(|m| m.user_id == user_id);
    let admins = members.iter().filter(|m| m.is_admin()).count();
    match target {
        None => Err(AppError::not_found(format!(
            "User {user_id} is not a member of this organization"
        ))),
        Some(m) if m.is_admin() && admins <= 1 => Err(AppError::forbidden(LAST_ADMIN_MESSAGE)),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn member(user: i64, role: OrgRole) -> OrganizationMember {
        let now = Utc::now();
        OrganizationMember {
            organization_id: OrganizationId::new(1),
            user_id: UserId::new(user),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_guard_rejects_sole_admin() {
        let members = vec![member(1, OrgRole::Admin), member(2, OrgRole::Member)];
        let err = guard_last_admin(&members, UserId::new(1)).expect_err("sole admin");
        assert!(err.is(ddup_core::ErrorKind::Forbidden));
        assert!(guard_last_admin(&members, UserId::new(2)).is_ok());
    }

    #[test]
    fn test_guard_allows_one_of_two_admins() {
        let members = vec![member(1, OrgRole::Admin), member(2, OrgRole::Admin)];
        assert!(guard_last_admin(&members, UserId::new(1)).is_ok());
    }

    #[test]
    fn test_guard_missing_member() {
        let members = vec![member(1, OrgRole::Admin)];
        let err = guard_last_admin(&members, UserId::new(9)).expect_err("absent");
        assert!(err.is(ddup_core::ErrorKind::NotFound));
    }
}
