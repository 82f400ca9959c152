//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use ddup_auth::Gatekeeper;
use ddup_core::config::AppConfig;
use ddup_database::Stores;
use ddup_service::{OrganizationService, SessionService, UserService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Persistence backends, used directly only by the readiness check
    pub stores: Stores,
    /// Per-request token check
    pub gatekeeper: Arc<Gatekeeper>,
    /// Login, logout, refresh
    pub session_service: Arc<SessionService>,
    /// Registration, profile, password change
    pub user_service: Arc<UserService>,
    /// Organizations and memberships
    pub org_service: Arc<OrganizationService>,
}
