//! Application builder: wires components into `AppState` and layers the
//! middleware onto the router.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use ddup_auth::{
    Gatekeeper, JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator, RbacResolver,
    SessionLedger,
};
use ddup_core::AppResult;
use ddup_core::config::AppConfig;
use ddup_database::Stores;
use ddup_service::{OrganizationService, SessionService, UserService};

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Constructs every auth component and service from the configuration.
///
/// Fails with a configuration error when the auth settings cannot build a
/// hasher or token codec.
pub fn build_state(config: Arc<AppConfig>, stores: Stores) -> AppResult<AppState> {
    let auth = &config.auth;

    let hasher = Arc::new(PasswordHasher::new(auth)?);
    let validator = Arc::new(PasswordValidator::new(auth));
    let encoder = Arc::new(JwtEncoder::new(auth)?);
    let decoder = Arc::new(JwtDecoder::new(auth)?);
    let ledger = Arc::new(SessionLedger::new(stores.sessions.clone(), auth));
    let gatekeeper = Arc::new(Gatekeeper::new(Arc::clone(&decoder), Arc::clone(&ledger)));
    let rbac = Arc::new(RbacResolver::new(stores.organizations.clone()));

    let session_service = Arc::new(SessionService::new(
        stores.users.clone(),
        Arc::clone(&hasher),
        encoder,
        decoder,
        ledger,
        Arc::clone(&gatekeeper),
    ));
    let user_service = Arc::new(UserService::new(stores.users.clone(), hasher, validator));
    let org_service = Arc::new(OrganizationService::new(
        stores.organizations.clone(),
        stores.users.clone(),
        rbac,
    ));

    Ok(AppState {
        config,
        stores,
        gatekeeper,
        session_service,
        user_service,
        org_service,
    })
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_logging))
}
