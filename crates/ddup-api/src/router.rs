//! Route definitions for the DDUP HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::handlers;
use crate::state::AppState;

/// Build the API routes and attach the state.
///
/// Middleware is layered on by [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(organization_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Register, login, logout, refresh, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/me", get(handlers::auth::me))
}

/// Account self-service
fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/users/{user_id}/password",
        put(handlers::user::change_password),
    )
}

/// Organizations and memberships
fn organization_routes() -> Router<AppState> {
    use handlers::organization as org;

    Router::new()
        .route(
            "/orgs",
            post(org::create_organization).get(org::list_organizations),
        )
        .route(
            "/orgs/{org_id}",
            get(org::get_organization)
                .put(org::update_organization)
                .delete(org::delete_organization),
        )
        .route(
            "/orgs/{org_id}/members",
            get(org::list_members).post(org::add_member),
        )
        .route(
            "/orgs/{org_id}/members/{user_id}",
            put(org::update_member_role).delete(org::remove_member),
        )
}

/// Liveness and readiness
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/ready", get(handlers::health::ready))
}
