//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ddup_entity::user::UserSummary;
use ddup_service::LoginResult;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Login and refresh response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// Always `Bearer`.
    pub token_type: String,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// Seconds until expiry.
    pub expires_in: i64,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: UserSummary,
}

impl From<LoginResult> for LoginResponse {
    fn from(result: LoginResult) -> Self {
        Self {
            token: result.token,
            token_type: "Bearer".to_string(),
            issued_at: result.issued_at,
            expires_in: result.expires_in_seconds,
            expires_at: result.expires_at,
            user: result.user,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
}

/// Readiness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Overall status.
    pub status: String,
    /// Storage driver in use.
    pub driver: String,
    /// Storage reachability.
    pub storage: String,
}
