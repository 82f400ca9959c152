//! `AuthUser` extractor: pulls the bearer token, validates it through the
//! gatekeeper, and injects the caller's context.

use axum::extract::{FromRequestParts, Query};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::Uri;
use serde::Deserialize;

use ddup_auth::gatekeeper::extract_bearer;
use ddup_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Query string fallback for clients that cannot set headers.
#[derive(Debug, Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

fn query_token(uri: &Uri) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.access_token)
        .filter(|t| !t.is_empty())
}

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        // The header wins when present, even if malformed.
        let identity = match (header, query_token(&parts.uri)) {
            (None, Some(token)) => state.gatekeeper.authenticate(&token).await?,
            _ => state.gatekeeper.validate_request(header).await?,
        };

        Ok(AuthUser(RequestContext::from(identity)))
    }
}

/// The raw bearer token, if any, without validating it.
///
/// Used by logout and refresh, which must accept tokens the gatekeeper
/// would reject.
#[derive(Debug, Clone, Default)]
pub struct RawToken(pub Option<String>);

impl<S> FromRequestParts<S> for RawToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_bearer)
            .map(String::from);

        Ok(RawToken(from_header.or_else(|| query_token(&parts.uri))))
    }
}
