//! The session ledger.
//!
//! Signed tokens cannot be withdrawn before they expire, so every issued
//! token gets a row here and the ledger has the final word on whether it
//! still authorizes requests. Each user has at most one valid row: a login
//! supersedes every earlier session of that user.
//!
//! Tokens are stored as SHA-256 fingerprints, never in clear.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use ddup_core::config::{AuthConfig, MAX_TOKEN_LIFETIME_SECONDS};
use ddup_core::result::AppResult;
use ddup_core::types::UserId;
use ddup_database::SessionStore;
use ddup_entity::session::{NewSession, Session};

/// Hex-encoded SHA-256 of a raw token.
pub fn fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Records issued tokens and answers whether they are still usable.
#[derive(Debug, Clone)]
pub struct SessionLedger {
    /// Backing store.
    store: Arc<dyn SessionStore>,
    /// How long past expiry a valid row may still be refreshed.
    refresh_grace: Duration,
}

impl SessionLedger {
    /// Creates a ledger over the given store.
    pub fn new(store: Arc<dyn SessionStore>, config: &AuthConfig) -> Self {
        Self {
            store,
            refresh_grace: Duration::seconds(
                config.refresh_grace_seconds.min(MAX_TOKEN_LIFETIME_SECONDS) as i64,
            ),
        }
    }

    /// Records a new login.
    ///
    /// Atomically invalidates every valid session of the user and inserts
    /// the new one. If this fails the token must not be handed out.
    pub async fn login(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session> {
        let session = self
            .store
            .replace_for_user(NewSession::new(user_id, fingerprint(token), expires_at))
            .await?;

        info!(
            user_id = %user_id,
            session_id = %session.id,
            expires_at = %expires_at,
            "Session recorded"
        );
        Ok(session)
    }

    /// Marks the session for `token` invalid.
    ///
    /// Unknown and already revoked tokens succeed silently; callers cannot
    /// tell them apart from a live session that was just revoked.
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        let changed = self.store.invalidate_by_token_hash(&fingerprint(token)).await?;
        debug!(changed, "Session revoke requested");
        Ok(())
    }

    /// Whether `token` has a row that is valid and unexpired.
    pub async fn is_active(&self, token: &str) -> AppResult<bool> {
        self.is_active_at(token, Utc::now()).await
    }

    /// [`Self::is_active`] against an explicit clock.
    ///
    /// An expired row is never active. Its `valid` flag is flipped lazily,
    /// but only once the refresh grace window has passed too, so that a
    /// refresh inside the window still finds it valid.
    pub async fn is_active_at(&self, token: &str, now: DateTime<Utc>) -> AppResult<bool> {
        let Some(session) = self.store.find_by_token_hash(&fingerprint(token)).await? else {
            return Ok(false);
        };

        if session.is_usable_at(now) {
            return Ok(true);
        }

        if session.valid && now >= session.expires_at + self.refresh_grace {
            match self.store.invalidate(session.id).await {
                Ok(_) => debug!(session_id = %session.id, "Lapsed session invalidated"),
                Err(e) => warn!(
                    session_id = %session.id,
                    error = %e,
                    "Failed to invalidate lapsed session"
                ),
            }
        }

        Ok(false)
    }

    /// Whether an expiry still lies inside the refresh window at `now`.
    pub fn within_refresh_window(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now < expires_at + self.refresh_grace
    }

    /// Swaps the still-valid session of `old_token` for a new token.
    ///
    /// Returns `None` when the old session is unknown, revoked, or was
    /// superseded; nothing changes in that case.
    pub async fn rotate(
        &self,
        old_token: &str,
        user_id: UserId,
        new_token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        let rotated = self
            .store
            .rotate(
                &fingerprint(old_token),
                NewSession::new(user_id, fingerprint(new_token), expires_at),
            )
            .await?;

        if let Some(session) = &rotated {
            info!(user_id = %user_id, session_id = %session.id, "Session rotated");
        }
        Ok(rotated)
    }
}
