//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use ddup_core::types::{SessionId, UserId};

/// A row in the session ledger.
///
/// The raw bearer token is never stored; `token_hash` holds its SHA-256
/// fingerprint. A user has at most one row with `valid = true`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// The user who owns this session.
    pub user_id: UserId,
    /// Hex-encoded SHA-256 of the issued token.
    #[serde(skip_serializing)]
    pub token_hash: String,
    /// Whether the session still accepts requests.
    pub valid: bool,
    /// Equals the `exp` claim of the token.
    pub expires_at: DateTime<Utc>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was invalidated (logout, newer login, lapse).
    pub invalidated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the row authorizes a request at `now`.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.valid && now < self.expires_at
    }
}

/// Data required to record a new session.
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Owner of the session.
    pub user_id: UserId,
    /// Fingerprint of the issued token.
    pub token_hash: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
}

impl NewSession {
    /// Create a new session payload.
    pub fn new(user_id: UserId, token_hash: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            token_hash: token_hash.into(),
            expires_at,
        }
    }
}
