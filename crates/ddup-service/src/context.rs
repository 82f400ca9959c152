//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ddup_auth::Identity;
use ddup_core::types::UserId;

/// Context for the current authenticated request.
///
/// Built from the gatekeeper's [`Identity`] and passed into service methods
/// so that every operation knows who is acting. Authorization decisions use
/// this identity, never anything the client sends in the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The username from the token.
    pub username: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            request_time: Utc::now(),
        }
    }

    /// The caller as a gatekeeper identity.
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            username: self.username.clone(),
        }
    }
}

impl From<Identity> for RequestContext {
    fn from(identity: Identity) -> Self {
        Self::new(identity.user_id, identity.username)
    }
}
