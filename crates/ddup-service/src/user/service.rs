//! User self-service operations: registration, profile, password change.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ddup_auth::password::{PasswordHasher, PasswordValidator};
use ddup_core::error::AppError;
use ddup_core::types::UserId;
use ddup_database::UserStore;
use ddup_entity::user::{NewUser, User, UserSummary};

use crate::context::RequestContext;

/// Shortest accepted username.
pub const USERNAME_MIN_LENGTH: usize = 3;
/// Longest accepted username.
pub const USERNAME_MAX_LENGTH: usize = 32;

/// Checks a username: 3 to 32 ASCII letters, digits, `_` or `-`.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    let len = username.chars().count();
    let charset_ok = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len) || !charset_ok {
        return Err(AppError::validation(format!(
            "Username must be {USERNAME_MIN_LENGTH}-{USERNAME_MAX_LENGTH} characters of letters, digits, '_' or '-'"
        )));
    }
    Ok(())
}

/// Data for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Display name; defaults to the username.
    pub nickname: Option<String>,
    /// Email address.
    pub email: Option<String>,
}

/// Handles account operations.
#[derive(Debug, Clone)]
pub struct UserService {
    /// User store.
    users: Arc<dyn UserStore>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password validator.
    validator: Arc<PasswordValidator>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
    ) -> Self {
        Self {
            users,
            hasher,
            validator,
        }
    }

    /// Creates an active account.
    pub async fn register(&self, req: RegisterRequest) -> Result<UserSummary, AppError> {
        let username = req.username.trim();
        validate_username(username)?;
        self.validator.validate(&req.password, username)?;

        let password_hash = self.hasher.hash(&req.password)?;
        let user = self
            .users
            .create(
                NewUser::new(username, password_hash)
                    .with_nickname(req.nickname)
                    .with_email(req.email),
            )
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user.summary())
    }

    /// Loads a user or fails with `NotFound`.
    pub async fn get(&self, user_id: UserId) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// The caller's own profile.
    pub async fn me(&self, ctx: &RequestContext) -> Result<UserSummary, AppError> {
        Ok(self.get(ctx.user_id).await?.summary())
    }

    /// Changes a user's password after checking the old one.
    ///
    /// A wrong old password is `InvalidCredentials` and leaves the stored
    /// hash untouched. Reusing the old password is a `Validation` error.
    /// Existing sessions stay valid.
    pub async fn change_password(
        &self,
        user_id: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user = self.get(user_id).await?;

        if !self.hasher.verify(old_password, &user.password_hash) {
            debug!(user_id = %user_id, "Password change rejected: old password mismatch");
            return Err(AppError::invalid_credentials());
        }

        self.validator.validate_not_same(old_password, new_password)?;
        self.validator.validate(new_password, &user.username)?;

        let password_hash = self.hasher.hash(new_password)?;
        self.users.update_password(user_id, &password_hash).await?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::services;
    use ddup_core::ErrorKind;

    #[test]
    fn test_validate_username() {
        let longest = "x".repeat(USERNAME_MAX_LENGTH);
        let too_long = "x".repeat(USERNAME_MAX_LENGTH + 1);
        for ok in ["bob", "alice_01", "a-b-c", longest.as_str()] {
            assert!(validate_username(ok).is_ok(), "{ok}");
        }
        for bad in ["ab", "has space", "émile", "semi;colon", too_long.as_str()] {
            assert!(validate_username(bad).is_err(), "{bad}");
        }
    }

    #[tokio::test]
    async fn test_register_fills_defaults() {
        let s = services();
        let user = s
            .users
            .register(RegisterRequest {
                username: "alice".into(),
                password: "correct-pw".into(),
                nickname: None,
                email: Some("alice@example.com".into()),
            })
            .await
            .expect("register");
        assert_eq!(user.nickname, "alice");
        assert_eq!(user.email.as_deref(), Some("alice@example.com"));

        let err = s
            .users
            .register(RegisterRequest {
                username: "ALICE".into(),
                password: "correct-pw".into(),
                nickname: None,
                email: None,
            })
            .await
            .expect_err("duplicate");
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let s = services();
        let err = s
            .users
            .register(RegisterRequest {
                username: "alice".into(),
                password: "short".into(),
                nickname: None,
                email: None,
            })
            .await
            .expect_err("short");
        assert!(err.is(ErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_change_password_wrong_old_keeps_hash() {
        let s = services();
        let alice = s.register("alice", "correct-pw").await;
        let before = s.users.get(alice.user_id).await.expect("user").password_hash;

        let err = s
            .users
            .change_password(alice.user_id, "wrong-old", "new-password")
            .await
            .expect_err("wrong old");
        assert!(err.is(ErrorKind::InvalidCredentials));

        let after = s.users.get(alice.user_id).await.expect("user").password_hash;
        assert_eq!(before, after);
        assert!(s.sessions.login("alice", "correct-pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_same_rejected() {
        let s = services();
        let alice = s.register("alice", "correct-pw").await;
        let err = s
            .users
            .change_password(alice.user_id, "correct-pw", "correct-pw")
            .await
            .expect_err("same");
        assert!(err.is(ErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_change_password_success() {
        let s = services();
        let alice = s.register("alice", "correct-pw").await;
        s.users
            .change_password(alice.user_id, "correct-pw", "brand-new-pw")
            .await
            .expect("change");

        assert!(s.sessions.login("alice", "correct-pw").await.is_err());
        assert!(s.sessions.login("alice", "brand-new-pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password_unknown_user() {
        let s = services();
        let err = s
            .users
            .change_password(UserId::new(404), "a", "b")
            .await
            .expect_err("missing");
        assert!(err.is(ErrorKind::NotFound));
    }
}
