//! Password policy enforcement for new passwords.

use ddup_core::config::AuthConfig;
use ddup_core::error::AppError;

/// Validates new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length in characters.
    min_length: usize,
    /// Minimum zxcvbn score; `0` disables the entropy check.
    min_strength: u8,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_strength: config.password_min_strength,
        }
    }

    /// Validates a password for the given user.
    ///
    /// The username is fed to the strength estimator so that passwords
    /// derived from it score low.
    pub fn validate(&self, password: &str, username: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if self.min_strength > 0 {
            let estimate = zxcvbn::zxcvbn(password, &[username]);
            if (estimate.score() as u8) < self.min_strength {
                return Err(AppError::validation(
                    "Password is too weak. Please use a stronger password with more entropy.",
                ));
            }
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(min_strength: u8) -> PasswordValidator {
        PasswordValidator::new(&AuthConfig {
            password_min_length: 8,
            password_min_strength: min_strength,
            ..AuthConfig::default()
        })
    }

    #[test]
    fn test_min_length() {
        assert!(validator(0).validate("short", "alice").is_err());
        assert!(validator(0).validate("long-enough", "alice").is_ok());
    }

    #[test]
    fn test_strength_check() {
        assert!(validator(3).validate("password", "alice").is_err());
        assert!(
            validator(3)
                .validate("correct horse battery staple 1984!", "alice")
                .is_ok()
        );
    }

    #[test]
    fn test_same_password_rejected() {
        let err = validator(0)
            .validate_not_same("old-password", "old-password")
            .expect_err("same");
        assert!(err.is(ddup_core::ErrorKind::Validation));
        assert!(validator(0).validate_not_same("a", "b").is_ok());
    }
}
