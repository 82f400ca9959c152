//! Database configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which persistence implementation backs the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// PostgreSQL via sqlx.
    #[default]
    Postgres,
    /// Process-local store for tests and development.
    Memory,
}

impl fmt::Display for DatabaseDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postgres => write!(f, "postgres"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Storage implementation.
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// PostgreSQL connection URL (ignored by the memory driver).
    #[serde(default)]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection acquire timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Server-side statement timeout in seconds (`0` disables it).
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_seconds: u64,
    /// Additional connection attempts at startup.
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    /// Delay between connection attempts in seconds.
    #[serde(default = "default_retry_interval")]
    pub retry_interval_seconds: u64,
    /// Interval of the background liveness probe in seconds.
    #[serde(default = "default_health_interval")]
    pub health_check_interval_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            statement_timeout_seconds: default_statement_timeout(),
            connect_retries: default_connect_retries(),
            retry_interval_seconds: default_retry_interval(),
            health_check_interval_seconds: default_health_interval(),
        }
    }
}

impl DatabaseConfig {
    /// Validates the database section.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.driver == DatabaseDriver::Postgres && self.url.trim().is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres driver",
            ));
        }
        if self.health_check_interval_seconds == 0 {
            return Err(AppError::configuration(
                "database.health_check_interval_seconds must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Returns the liveness probe interval.
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_seconds)
    }
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_statement_timeout() -> u64 {
    15
}

fn default_connect_retries() -> u32 {
    3
}

fn default_retry_interval() -> u64 {
    2
}

fn default_health_interval() -> u64 {
    30
}
