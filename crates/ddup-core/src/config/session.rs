//! Session ledger housekeeping configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Upper bound for `retention_hours` (ten years).
pub const MAX_RETENTION_HOURS: u64 = 10 * 365 * 24;

/// Session housekeeping configuration.
///
/// None of these settings affect whether a session is usable; they only
/// control how long dead rows stay in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Interval between cleanup sweeps in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
    /// How long invalid or expired rows are retained before purge, in hours.
    #[serde(default = "default_retention")]
    pub retention_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_seconds: default_cleanup_interval(),
            retention_hours: default_retention(),
        }
    }
}

impl SessionConfig {
    /// Validates the session section.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.cleanup_interval_seconds == 0 {
            return Err(AppError::configuration(
                "session.cleanup_interval_seconds must be greater than zero",
            ));
        }
        if self.retention_hours > MAX_RETENTION_HOURS {
            return Err(AppError::configuration(
                "session.retention_hours must not exceed ten years",
            ));
        }
        Ok(())
    }
}

fn default_cleanup_interval() -> u64 {
    900
}

fn default_retention() -> u64 {
    72
}
