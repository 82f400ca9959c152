//! Authentication configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Upper bound for `token_ttl_seconds` and `refresh_grace_seconds` (one year).
pub const MAX_TOKEN_LIFETIME_SECONDS: u64 = 365 * 24 * 3600;

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing. Required; must not be empty.
    #[serde(default)]
    pub jwt_secret: String,
    /// Symmetric MAC used to sign tokens: `HS256`, `HS384` or `HS512`.
    #[serde(default = "default_algorithm")]
    pub jwt_algorithm: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_seconds: u64,
    /// How long after expiry a still-valid session may be refreshed, in seconds.
    #[serde(default)]
    pub refresh_grace_seconds: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Minimum zxcvbn score (0-4) for new passwords; `0` disables the check.
    #[serde(default)]
    pub password_min_strength: u8,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    /// Argon2 degree of parallelism.
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_algorithm: default_algorithm(),
            token_ttl_seconds: default_token_ttl(),
            refresh_grace_seconds: 0,
            password_min_length: default_password_min(),
            password_min_strength: 0,
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
        }
    }
}

impl AuthConfig {
    /// Validates the auth section.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("auth.jwt_secret is required"));
        }
        if self.token_ttl_seconds == 0 {
            return Err(AppError::configuration(
                "auth.token_ttl_seconds must be greater than zero",
            ));
        }
        if self.token_ttl_seconds > MAX_TOKEN_LIFETIME_SECONDS
            || self.refresh_grace_seconds > MAX_TOKEN_LIFETIME_SECONDS
        {
            return Err(AppError::configuration(
                "auth.token_ttl_seconds and auth.refresh_grace_seconds must not exceed one year",
            ));
        }
        self.algorithm()?;
        if self.password_min_strength > 4 {
            return Err(AppError::configuration(
                "auth.password_min_strength must be between 0 and 4",
            ));
        }
        if self.hash_memory_kib == 0 || self.hash_iterations == 0 || self.hash_parallelism == 0 {
            return Err(AppError::configuration(
                "auth hash cost parameters must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Returns the parsed signing algorithm.
    pub fn algorithm(&self) -> Result<SigningAlgorithm, AppError> {
        self.jwt_algorithm.parse()
    }
}

/// Symmetric MAC schemes accepted for token signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256.
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HS256 => write!(f, "HS256"),
            Self::HS384 => write!(f, "HS384"),
            Self::HS512 => write!(f, "HS512"),
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            _ => Err(AppError::configuration(format!(
                "Unsupported signing algorithm '{s}'. Expected one of: HS256, HS384, HS512"
            ))),
        }
    }
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_token_ttl() -> u64 {
    86_400
}

fn default_password_min() -> usize {
    8
}

fn default_hash_memory() -> u32 {
    19_456
}

fn default_hash_iterations() -> u32 {
    2
}

fn default_hash_parallelism() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("hs512".parse::<SigningAlgorithm>().unwrap(), SigningAlgorithm::HS512);
        assert!("RS256".parse::<SigningAlgorithm>().is_err());
    }

    #[test]
    fn test_oversized_grace_rejected() {
        let config = AuthConfig {
            jwt_secret: "x".into(),
            refresh_grace_seconds: MAX_TOKEN_LIFETIME_SECONDS + 1,
            ..AuthConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_cost_rejected() {
        let config = AuthConfig {
            jwt_secret: "x".into(),
            hash_iterations: 0,
            ..AuthConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
