use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ddup_core::error::AppError;
use ddup_core::result::AppResult;
use ddup_core::types::UserId;
use ddup_entity::user::{NewUser, User, UserStatus};

use super::MemoryStore;
use crate::store::UserStore;

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.lock().await;

        let wanted = user.username.to_lowercase();
        if tables
            .users
            .values()
            .any(|u| u.username.to_lowercase() == wanted)
        {
            return Err(AppError::conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }

        let now = Utc::now();
        let created = User {
            id: tables.next_user_id(),
            username: user.username,
            password_hash: user.password_hash,
            nickname: user.nickname,
            email: user.email,
            status: user.status,
            failed_login_attempts: 0,
            locked_until: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let wanted = username.to_lowercase();
        Ok(self
            .tables
            .lock()
            .await
            .users
            .values()
            .find(|u| u.username.to_lowercase() == wanted)
            .cloned())
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_last_login(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()> {
        if let Some(user) = self.tables.lock().await.users.get_mut(&id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn update_status(&self, id: UserId, status: UserStatus) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.status = status;
        user.updated_at = Utc::now();
        Ok(())
    }
}
