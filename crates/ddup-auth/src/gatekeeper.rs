//! Per-request authentication.
//!
//! A request passes through three checks: a bearer token must be present,
//! it must verify (signature, then expiry), and the session ledger must
//! still consider it active. Every rejection produces the same
//! `Unauthorized` error; the specific reason is only logged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use ddup_core::error::AppError;
use ddup_core::result::AppResult;
use ddup_core::types::UserId;

use crate::jwt::JwtDecoder;
use crate::session::SessionLedger;

/// Message carried by every authentication rejection.
pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication required";

/// The authenticated caller, attached to the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Authenticated user ID.
    pub user_id: UserId,
    /// Username from the token.
    pub username: String,
}

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; an empty token counts as absent.
pub fn extract_bearer(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn rejected() -> AppError {
    AppError::unauthorized(AUTH_REQUIRED_MESSAGE)
}

/// Turns raw bearer tokens into identities.
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    /// Token verifier.
    decoder: Arc<JwtDecoder>,
    /// Revocation authority.
    ledger: Arc<SessionLedger>,
}

impl Gatekeeper {
    /// Creates a new gatekeeper.
    pub fn new(decoder: Arc<JwtDecoder>, ledger: Arc<SessionLedger>) -> Self {
        Self { decoder, ledger }
    }

    /// Authenticates from an `Authorization` header value, if any.
    pub async fn validate_request(&self, header_value: Option<&str>) -> AppResult<Identity> {
        let Some(token) = header_value.and_then(extract_bearer) else {
            debug!(reason = "missing_token", "Request rejected");
            return Err(rejected());
        };
        self.authenticate(token).await
    }

    /// Authenticates a raw token.
    ///
    /// Storage failures propagate unchanged; they are not authentication
    /// failures.
    pub async fn authenticate(&self, token: &str) -> AppResult<Identity> {
        let claims = self.decoder.verify(token).map_err(|e| {
            debug!(reason = %e, "Request rejected");
            rejected()
        })?;

        if !self.ledger.is_active(token).await? {
            debug!(
                user_id = %claims.user_id,
                reason = "session_inactive",
                "Request rejected"
            );
            return Err(rejected());
        }

        Ok(Identity {
            user_id: claims.user_id,
            username: claims.username,
        })
    }

    /// Ownership check for paths naming a user.
    ///
    /// The caller is authenticated, so a mismatch is `Forbidden`.
    pub fn require_subject(identity: &Identity, subject: UserId) -> AppResult<()> {
        if identity.user_id == subject {
            Ok(())
        } else {
            Err(AppError::forbidden("You may only act on your own account"))
        }
    }
}
