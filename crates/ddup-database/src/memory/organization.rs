use async_trait::async_trait;
use chrono::Utc;

use ddup_core::error::AppError;
use ddup_core::result::AppResult;
use ddup_core::types::{OrganizationId, UserId};
use ddup_entity::organization::{
    NewOrganization, OrgRole, Organization, OrganizationMember, UpdateOrganization,
};

use super::{MemoryStore, Tables};
use crate::store::{OrganizationStore, guard_last_admin};

impl Tables {
    fn name_taken(&self, name: &str, except: Option<OrganizationId>) -> bool {
        self.organizations
            .values()
            .any(|o| o.name == name && Some(o.id) != except)
    }

    fn members_of(&self, org_id: OrganizationId) -> Vec<OrganizationMember> {
        let mut members: Vec<_> = self
            .members
            .values()
            .filter(|m| m.organization_id == org_id)
            .cloned()
            .collect();
        members.sort_by(|a, b| {
            b.role
                .privilege_level()
                .cmp(&a.role.privilege_level())
                .then(a.user_id.cmp(&b.user_id))
        });
        members
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn create_with_admin(&self, org: NewOrganization) -> AppResult<Organization> {
        let mut tables = self.tables.lock().await;

        if tables.name_taken(&org.name, None) {
            return Err(AppError::conflict(format!(
                "Organization name '{}' is already taken",
                org.name
            )));
        }
        if !tables.users.contains_key(&org.created_by) {
            return Err(AppError::not_found(format!("User {} not found", org.created_by)));
        }

        let now = Utc::now();
        let created = Organization {
            id: tables.next_organization_id(),
            name: org.name,
            display_name: org.display_name,
            description: org.description,
            email: org.email,
            website: org.website,
            created_by: org.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.organizations.insert(created.id, created.clone());
        tables.members.insert(
            (created.id, created.created_by),
            OrganizationMember {
                organization_id: created.id,
                user_id: created.created_by,
                role: OrgRole::Admin,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(created)
    }

    async fn find_by_id(&self, id: OrganizationId) -> AppResult<Option<Organization>> {
        Ok(self.tables.lock().await.organizations.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> AppResult<Vec<Organization>> {
        let tables = self.tables.lock().await;
        let mut orgs: Vec<_> = tables
            .members
            .values()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| tables.organizations.get(&m.organization_id).cloned())
            .collect();
        orgs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(orgs)
    }

    async fn update(
        &self,
        id: OrganizationId,
        update: &UpdateOrganization,
    ) -> AppResult<Organization> {
        let mut tables = self.tables.lock().await;

        if let Some(name) = &update.name {
            if tables.name_taken(name, Some(id)) {
                return Err(AppError::conflict("Organization name is already taken"));
            }
        }

        let org = tables
            .organizations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Organization {id} not found")))?;
        update.apply_to(org);
        org.updated_at = Utc::now();
        Ok(org.clone())
    }

    async fn delete(&self, id: OrganizationId) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        if tables.organizations.remove(&id).is_none() {
            return Ok(false);
        }
        tables.members.retain(|(org_id, _), _| *org_id != id);
        Ok(true)
    }

    async fn find_member(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<OrganizationMember>> {
        Ok(self
            .tables
            .lock()
            .await
            .members
            .get(&(org_id, user_id))
            .cloned())
    }

    async fn list_members(&self, org_id: OrganizationId) -> AppResult<Vec<OrganizationMember>> {
        Ok(self.tables.lock().await.members_of(org_id))
    }

    async fn add_member(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
        role: OrgRole,
    ) -> AppResult<OrganizationMember> {
        let mut tables = self.tables.lock().await;

        if !tables.organizations.contains_key(&org_id) || !tables.users.contains_key(&user_id) {
            return Err(AppError::not_found("Organization or user not found"));
        }
        if tables.members.contains_key(&(org_id, user_id)) {
            return Err(AppError::conflict(format!("User {user_id} is already a member")));
        }

        let now = Utc::now();
        let member = OrganizationMember {
            organization_id: org_id,
            user_id,
            role,
            created_at: now,
            updated_at: now,
        };
        tables.members.insert((org_id, user_id), member.clone());
        Ok(member)
    }

    async fn update_member_role(
        &self,
        org_id: OrganizationId,
        user_id: UserId,
        role: OrgRole,
    ) -> AppResult<OrganizationMember> {
        let mut tables = self.tables.lock().await;

        if role != OrgRole::Admin {
            guard_last_admin(&tables.members_of(org_id), user_id)?;
        }

        let member = tables.members.get_mut(&(org_id, user_id)).ok_or_else(|| {
            AppError::not_found(format!("User {user_id} is not a member of this organization"))
        })?;
        member.role = role;
        member.updated_at = Utc::now();
        Ok(member.clone())
    }

    async fn remove_member(&self, org_id: OrganizationId, user_id: UserId) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        guard_last_admin(&tables.members_of(org_id), user_id)?;
        tables.members.remove(&(org_id, user_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UserStore;
    use ddup_core::ErrorKind;
    use ddup_entity::user::NewUser;

    async fn setup() -> (MemoryStore, UserId, UserId, Organization) {
        let store = MemoryStore::new();
        let alice = store.create(NewUser::new("alice", "h")).await.expect("alice");
        let bob = store.create(NewUser::new("bob", "h")).await.expect("bob");
        let org = store
            .create_with_admin(NewOrganization::new("acme", alice.id))
            .await
            .expect("org");
        (store, alice.id, bob.id, org)
    }

    #[tokio::test]
    async fn test_creator_becomes_admin() {
        let (store, alice, _, org) = setup().await;
        let member = store
            .find_member(org.id, alice)
            .await
            .expect("find")
            .expect("membership");
        assert_eq!(member.role, OrgRole::Admin);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let (store, _, bob, _) = setup().await;
        let err = store
            .create_with_admin(NewOrganization::new("acme", bob))
            .await
            .expect_err("taken");
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_duplicate_membership_conflicts() {
        let (store, _, bob, org) = setup().await;
        store
            .add_member(org.id, bob, OrgRole::Member)
            .await
            .expect("add");
        let err = store
            .add_member(org.id, bob, OrgRole::Admin)
            .await
            .expect_err("dup");
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_last_admin_cannot_leave_or_be_demoted() {
        let (store, alice, bob, org) = setup().await;
        store
            .add_member(org.id, bob, OrgRole::Member)
            .await
            .expect("add");

        let err = store.remove_member(org.id, alice).await.expect_err("remove");
        assert!(err.is(ErrorKind::Forbidden));
        let err = store
            .update_member_role(org.id, alice, OrgRole::Member)
            .await
            .expect_err("demote");
        assert!(err.is(ErrorKind::Forbidden));

        store
            .update_member_role(org.id, bob, OrgRole::Admin)
            .await
            .expect("promote");
        store
            .update_member_role(org.id, alice, OrgRole::Member)
            .await
            .expect("demote with another admin");
    }

    #[tokio::test]
    async fn test_delete_cascades_memberships() {
        let (store, alice, _, org) = setup().await;
        assert!(store.delete(org.id).await.expect("delete"));
        assert!(store.find_member(org.id, alice).await.expect("find").is_none());
        assert!(store.list_for_user(alice).await.expect("list").is_empty());
        assert!(!store.delete(org.id).await.expect("second delete"));
    }

    #[tokio::test]
    async fn test_rename_conflict() {
        let (store, alice, _, org) = setup().await;
        store
            .create_with_admin(NewOrganization::new("globex", alice))
            .await
            .expect("second org");
        let update = UpdateOrganization {
            name: Some("globex".into()),
            ..Default::default()
        };
        let err = store.update(org.id, &update).await.expect_err("taken");
        assert!(err.is(ErrorKind::Conflict));
    }
}
