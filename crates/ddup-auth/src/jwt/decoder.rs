//! Token verification.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{DecodingKey, Validation, decode};
use thiserror::Error;

use ddup_core::config::AuthConfig;
use ddup_core::error::AppError;

use super::claims::Claims;
use super::jwt_algorithm;

/// Why a token failed verification.
///
/// Callers outside this crate must not surface the distinction to clients.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Not a well-formed token for this issuer.
    #[error("token is malformed")]
    Malformed,
    /// Correctly signed but past its expiry.
    #[error("token has expired")]
    Expired,
    /// The signature does not match.
    #[error("token signature is invalid")]
    InvalidSignature,
}

/// Verifies tokens minted by [`super::JwtEncoder`].
#[derive(Clone)]
pub struct JwtDecoder {
    /// Secret verification key.
    decoding_key: DecodingKey,
    /// Signature and expiry checks.
    validation: Validation,
    /// Signature-only checks, used for refresh.
    validation_ignoring_exp: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let mut validation = Validation::new(jwt_algorithm(config.algorithm()?));
        validation.validate_exp = true;
        // The session row expires at exactly `exp`; both checks must agree.
        validation.leeway = 0;

        let mut validation_ignoring_exp = validation.clone();
        validation_ignoring_exp.validate_exp = false;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            validation_ignoring_exp,
        })
    }

    /// Verifies signature and expiry and returns the claims.
    ///
    /// The signature is checked first, so a tampered token fails with
    /// [`TokenError::InvalidSignature`] whatever its claimed expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_with(token, &self.validation)
    }

    /// Verifies the signature only. The caller owns the expiry decision.
    pub fn verify_ignoring_expiry(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_with(token, &self.validation_ignoring_exp)
    }

    fn decode_with(&self, token: &str, validation: &Validation) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use chrono::Duration;
    use ddup_core::types::UserId;

    fn config(secret: &str, algorithm: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.into(),
            jwt_algorithm: algorithm.into(),
            token_ttl_seconds: 3600,
            ..AuthConfig::default()
        }
    }

    fn pair(secret: &str) -> (JwtEncoder, JwtDecoder) {
        let config = config(secret, "HS256");
        (
            JwtEncoder::new(&config).expect("encoder"),
            JwtDecoder::new(&config).expect("decoder"),
        )
    }

    /// Replace the first character of the signature segment.
    fn flip_signature(token: &str) -> String {
        let sig_start = token.rfind('.').expect("three segments") + 1;
        let mut bytes = token.as_bytes().to_vec();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).expect("ascii")
    }

    #[test]
    fn test_mint_then_verify() {
        let (encoder, decoder) = pair("secret");
        let minted = encoder.mint(UserId::new(1), "alice").expect("mint");

        assert_eq!(minted.token.split('.').count(), 3);
        assert_eq!(minted.expires_in_seconds(), 3600);

        let claims = decoder.verify(&minted.token).expect("verify");
        assert_eq!(claims.user_id, UserId::new(1));
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp, minted.expires_at.timestamp());
    }

    #[test]
    fn test_tokens_minted_together_differ() {
        let (encoder, _) = pair("secret");
        let a = encoder.mint(UserId::new(1), "alice").expect("mint");
        let b = encoder.mint(UserId::new(1), "alice").expect("mint");
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_flipped_signature_fails() {
        let (encoder, decoder) = pair("secret");
        let minted = encoder.mint(UserId::new(1), "alice").expect("mint");
        let tampered = flip_signature(&minted.token);

        assert_eq!(decoder.verify(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_expired_token_reports_signature() {
        let (encoder, decoder) = pair("secret");
        let minted = encoder
            .mint_with_ttl(UserId::new(1), "alice", Duration::seconds(-60))
            .expect("mint");
        let tampered = flip_signature(&minted.token);

        assert_eq!(decoder.verify(&minted.token), Err(TokenError::Expired));
        assert_eq!(decoder.verify(&tampered), Err(TokenError::InvalidSignature));
        assert!(decoder.verify_ignoring_expiry(&minted.token).is_ok());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let (encoder, _) = pair("secret");
        let (_, other) = pair("another-secret");
        let minted = encoder.mint(UserId::new(1), "alice").expect("mint");

        assert_eq!(other.verify(&minted.token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let (_, decoder) = pair("secret");
        assert_eq!(decoder.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(decoder.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let encoder = JwtEncoder::new(&config("secret", "HS512")).expect("encoder");
        let decoder = JwtDecoder::new(&config("secret", "HS256")).expect("decoder");
        let minted = encoder.mint(UserId::new(1), "alice").expect("mint");

        assert!(decoder.verify(&minted.token).is_err());
    }
}
