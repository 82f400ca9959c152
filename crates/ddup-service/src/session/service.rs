//! Session lifecycle: login, logout, refresh.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use ddup_auth::gatekeeper::AUTH_REQUIRED_MESSAGE;
use ddup_auth::{Gatekeeper, Identity, JwtDecoder, JwtEncoder, PasswordHasher, SessionLedger};
use ddup_core::error::AppError;
use ddup_database::UserStore;
use ddup_entity::user::{User, UserSummary};

/// Result of a successful login or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    /// Bearer token.
    pub token: String,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// Seconds until the token expires.
    pub expires_in_seconds: i64,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: UserSummary,
}

/// Manages the session lifecycle.
#[derive(Debug, Clone)]
pub struct SessionService {
    /// User store.
    users: Arc<dyn UserStore>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Token minting.
    encoder: Arc<JwtEncoder>,
    /// Token verification (refresh path).
    decoder: Arc<JwtDecoder>,
    /// Session ledger.
    ledger: Arc<SessionLedger>,
    /// Per-request authentication.
    gatekeeper: Arc<Gatekeeper>,
}

impl SessionService {
    /// Creates a new session service.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        ledger: Arc<SessionLedger>,
        gatekeeper: Arc<Gatekeeper>,
    ) -> Self {
        Self {
            users,
            hasher,
            encoder,
            decoder,
            ledger,
            gatekeeper,
        }
    }

    /// Performs the login flow:
    ///
    /// 1. Find the user and verify the password
    /// 2. Require an active account
    /// 3. Mint a token
    /// 4. Record it in the ledger, superseding every earlier session
    ///
    /// Every credential failure is the same `InvalidCredentials`. If the
    /// ledger write fails the token is discarded and the error returned.
    ///
    /// `failed_login_attempts` and `locked_until` are not consulted or
    /// updated here; locking is driven only by the account status.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AppError> {
        let Some(user) = self.users.find_by_username(username.trim()).await? else {
            self.hasher.verify_unknown(password);
            debug!(reason = "unknown_user", "Login rejected");
            return Err(AppError::invalid_credentials());
        };

        if !self.hasher.verify(password, &user.password_hash) {
            debug!(user_id = %user.id, reason = "wrong_password", "Login rejected");
            return Err(AppError::invalid_credentials());
        }

        if !user.can_login() {
            warn!(user_id = %user.id, status = %user.status, "Login rejected for inactive account");
            return Err(AppError::invalid_credentials());
        }

        let minted = self.encoder.mint(user.id, &user.username)?;
        let session = self
            .ledger
            .login(user.id, &minted.token, minted.expires_at)
            .await?;

        let now = Utc::now();
        if let Err(e) = self.users.update_last_login(user.id, now).await {
            warn!(user_id = %user.id, error = %e, "Failed to record last login");
        }

        info!(user_id = %user.id, session_id = %session.id, "Login successful");
        Ok(Self::result(
            minted.token,
            minted.issued_at,
            minted.expires_at,
            User {
                last_login_at: Some(now),
                ..user
            },
        ))
    }

    /// Revokes the session of `token`.
    ///
    /// Always succeeds for well-formed calls: unknown, expired, and already
    /// revoked tokens are treated like live ones.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.ledger.revoke(token).await
    }

    /// Exchanges a token for a fresh one.
    ///
    /// The token must carry a valid signature, must expire in the future or
    /// at most the configured grace period ago, and its session must still
    /// be valid. The old session is invalidated in the same atomic step.
    pub async fn refresh(&self, token: &str) -> Result<LoginResult, AppError> {
        let rejected = || AppError::unauthorized(AUTH_REQUIRED_MESSAGE);

        let claims = self.decoder.verify_ignoring_expiry(token).map_err(|e| {
            debug!(reason = %e, "Refresh rejected");
            rejected()
        })?;

        if !self
            .ledger
            .within_refresh_window(claims.expires_at(), Utc::now())
        {
            debug!(user_id = %claims.user_id, reason = "grace_elapsed", "Refresh rejected");
            return Err(rejected());
        }

        let user = match self.users.find_by_id(claims.user_id).await? {
            Some(user) if user.can_login() => user,
            _ => {
                debug!(user_id = %claims.user_id, reason = "user_unavailable", "Refresh rejected");
                return Err(rejected());
            }
        };

        let minted = self.encoder.mint(user.id, &user.username)?;
        let Some(session) = self
            .ledger
            .rotate(token, user.id, &minted.token, minted.expires_at)
            .await?
        else {
            debug!(user_id = %user.id, reason = "session_inactive", "Refresh rejected");
            return Err(rejected());
        };

        info!(user_id = %user.id, session_id = %session.id, "Token refreshed");
        Ok(Self::result(
            minted.token,
            minted.issued_at,
            minted.expires_at,
            user,
        ))
    }

    /// Authenticates an `Authorization` header value.
    pub async fn validate_request(&self, header_value: Option<&str>) -> Result<Identity, AppError> {
        self.gatekeeper.validate_request(header_value).await
    }

    fn result(
        token: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        user: User,
    ) -> LoginResult {
        LoginResult {
            token,
            issued_at,
            expires_in_seconds: (expires_at - issued_at).num_seconds(),
            expires_at,
            user: user.summary(),
        }
    }
}
