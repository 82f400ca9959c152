//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use ddup_core::types::UserId;

use super::status::UserStatus;

/// A registered user.
///
/// Users are never hard-deleted; their lifecycle ends with the
/// [`UserStatus::Disabled`] status.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login handle.
    pub username: String,
    /// Argon2id password hash (PHC string).
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name, defaults to the username.
    pub nickname: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Account lifecycle status.
    pub status: UserStatus,
    /// Consecutive failed login attempts. Persisted but not enforced.
    pub failed_login_attempts: i32,
    /// Lockout deadline. Persisted but not enforced.
    pub locked_until: Option<DateTime<Utc>>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the user can log in right now.
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    /// Public projection of the user.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            nickname: self.nickname.clone(),
            email: self.email.clone(),
            status: self.status,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
        }
    }
}

/// The parts of a [`User`] that may be returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User ID.
    pub id: UserId,
    /// Login handle.
    pub username: String,
    /// Display name.
    pub nickname: String,
    /// Email address.
    pub email: Option<String>,
    /// Account status.
    pub status: UserStatus,
    /// Last successful login.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Display name.
    pub nickname: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Initial status.
    pub status: UserStatus,
}

impl NewUser {
    /// Builds a creation payload with defaults filled in: the nickname
    /// mirrors the username and the account starts out active.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            nickname: username.clone(),
            username,
            password_hash: password_hash.into(),
            email: None,
            status: UserStatus::Active,
        }
    }

    /// Overrides the nickname; blank values keep the default.
    pub fn with_nickname(mut self, nickname: Option<String>) -> Self {
        if let Some(nickname) = nickname.filter(|n| !n.trim().is_empty()) {
            self.nickname = nickname;
        }
        self
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email.filter(|e| !e.trim().is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = NewUser::new("alice", "$argon2id$...");
        assert_eq!(user.nickname, "alice");
        assert_eq!(user.status, UserStatus::Active);
        assert!(user.email.is_none());
    }

    #[test]
    fn test_blank_nickname_keeps_default() {
        let user = NewUser::new("bob", "hash").with_nickname(Some("  ".into()));
        assert_eq!(user.nickname, "bob");

        let user = NewUser::new("bob", "hash").with_nickname(Some("Bobby".into()));
        assert_eq!(user.nickname, "Bobby");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: UserId::new(1),
            username: "alice".into(),
            password_hash: "secret-hash".into(),
            nickname: "alice".into(),
            email: None,
            status: UserStatus::Active,
            failed_login_attempts: 0,
            locked_until: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&user).expect("serialize");
        assert!(!json.contains("secret-hash"));
    }
}
