//! Token minting with the configured MAC scheme and TTL.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use ddup_core::config::{AuthConfig, MAX_TOKEN_LIFETIME_SECONDS};
use ddup_core::error::{AppError, ErrorKind};
use ddup_core::types::UserId;

use super::claims::Claims;
use super::jwt_algorithm;

/// A freshly signed token and its validity window.
#[derive(Debug, Clone)]
pub struct MintedToken {
    /// Compact serialized token.
    pub token: String,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// Expiry time, equal to the `exp` claim.
    pub expires_at: DateTime<Utc>,
}

impl MintedToken {
    /// Seconds between issue and expiry.
    pub fn expires_in_seconds(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}

/// 128 random bits, hex-encoded.
fn new_token_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Creates signed tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// Secret signing key.
    encoding_key: EncodingKey,
    /// Header naming the configured algorithm.
    header: Header,
    /// Token lifetime.
    ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("algorithm", &self.header.alg)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let ttl = Duration::seconds(
            config.token_ttl_seconds.min(MAX_TOKEN_LIFETIME_SECONDS) as i64,
        );

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            header: Header::new(jwt_algorithm(config.algorithm()?)),
            ttl,
        })
    }

    /// Configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mints a token for the user with the configured lifetime.
    pub fn mint(&self, user_id: UserId, username: &str) -> Result<MintedToken, AppError> {
        self.mint_with_ttl(user_id, username, self.ttl)
    }

    /// Mints a token with an explicit lifetime.
    pub fn mint_with_ttl(
        &self,
        user_id: UserId,
        username: &str,
        ttl: Duration,
    ) -> Result<MintedToken, AppError> {
        let issued_at = Utc::now();
        let expires_at = issued_at + ttl;

        let claims = Claims {
            user_id,
            username: username.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: new_token_id(),
        };

        let token = encode(&self.header, &claims, &self.encoding_key).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to encode token", e)
        })?;

        // Round to whole seconds so the session row matches the claim exactly.
        Ok(MintedToken {
            token,
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
        })
    }
}
