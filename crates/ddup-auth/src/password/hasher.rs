//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use thiserror::Error;

use ddup_core::config::AuthConfig;
use ddup_core::error::{AppError, ErrorKind};

/// Failures produced while hashing a password.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// The plaintext was empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// The hashing backend failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::EmptyPassword => AppError::validation("Password must not be empty"),
            PasswordError::Hashing(_) => {
                AppError::with_source(ErrorKind::Internal, "Password hashing failed", err)
            }
        }
    }
}

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    /// Cost parameters for newly created hashes.
    params: Params,
    /// Hash of a throwaway secret under `params`, verified against when the
    /// account does not exist.
    dummy_hash: String,
}

impl PasswordHasher {
    /// Creates a hasher with the Argon2 cost from auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;

        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        hasher.dummy_hash = hasher.hash(DUMMY_SECRET)?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password with a fresh random salt.
    ///
    /// Hashing the same password twice yields different PHC strings.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::EmptyPassword);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Never fails: a mismatch and an unparseable hash both yield `false`.
    /// The cost parameters are read from the stored hash, so hashes created
    /// under an older cost still verify.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spends one verification on the dummy hash and returns `false`.
    ///
    /// Login calls this for unknown usernames so that they cost the same as
    /// a wrong password for a known one.
    pub fn verify_unknown(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.dummy_hash);
        false
    }
}

const DUMMY_SECRET: &str = "ddup-identity-unknown-account";

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        let config = AuthConfig {
            hash_memory_kib: 1024,
            hash_iterations: 1,
            hash_parallelism: 1,
            ..AuthConfig::default()
        };
        PasswordHasher::new(&config).expect("valid params")
    }

    #[test]
    fn test_hash_is_salted_and_verifies() {
        let hasher = hasher();
        let first = hasher.hash("correct-pw").expect("hash");
        let second = hasher.hash("correct-pw").expect("hash");

        assert_ne!(first, second);
        assert!(hasher.verify("correct-pw", &first));
        assert!(hasher.verify("correct-pw", &second));
    }

    #[test]
    fn test_wrong_password_is_false() {
        let hasher = hasher();
        let hash = hasher.hash("correct-pw").expect("hash");
        assert!(!hasher.verify("wrong-pw", &hash));
    }

    #[test]
    fn test_empty_password_rejected() {
        assert_eq!(hasher().hash(""), Err(PasswordError::EmptyPassword));
    }

    #[test]
    fn test_garbage_hash_is_false() {
        assert!(!hasher().verify("anything", "not-a-phc-string"));
        assert!(!hasher().verify("anything", ""));
    }

    #[test]
    fn test_hash_from_other_cost_still_verifies() {
        let config = AuthConfig {
            hash_memory_kib: 2048,
            hash_iterations: 2,
            hash_parallelism: 1,
            ..AuthConfig::default()
        };
        let older = PasswordHasher::new(&config).expect("valid params");
        let hash = older.hash("correct-pw").expect("hash");
        assert!(hasher().verify("correct-pw", &hash));
    }

    #[test]
    fn test_dummy_hash_uses_configured_cost() {
        let hasher = hasher();
        let parsed = PasswordHash::new(&hasher.dummy_hash).expect("phc string");
        let params = Params::try_from(&parsed).expect("argon2 params");

        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert_eq!(params.m_cost(), 1024);
        assert_eq!(params.t_cost(), 1);
        assert_eq!(params.p_cost(), 1);
    }

    #[test]
    fn test_verify_unknown_is_always_false() {
        let hasher = hasher();
        assert!(!hasher.verify_unknown("anything"));
        assert!(!hasher.verify_unknown(DUMMY_SECRET));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let config = AuthConfig {
            hash_memory_kib: 1,
            ..AuthConfig::default()
        };
        assert!(PasswordHasher::new(&config).is_err());
    }
}
