//! Shared test helpers for integration tests.
//!
//! Every test builds the full router over the in-memory driver, so no
//! database is required.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use ddup_core::config::{AppConfig, AuthConfig, DatabaseConfig, DatabaseDriver};
use ddup_database::Stores;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Storage behind the router, for direct manipulation
    pub stores: Stores,
    /// Application config
    pub config: Arc<AppConfig>,
}

impl TestApp {
    /// Create a new test application without a refresh grace period.
    pub fn new() -> Self {
        Self::with_refresh_grace(0)
    }

    /// Create a new test application with the given refresh grace period.
    pub fn with_refresh_grace(refresh_grace_seconds: u64) -> Self {
        let config = AppConfig {
            database: DatabaseConfig {
                driver: DatabaseDriver::Memory,
                ..DatabaseConfig::default()
            },
            auth: AuthConfig {
                jwt_secret: "integration-test-secret".to_string(),
                token_ttl_seconds: 3600,
                refresh_grace_seconds,
                hash_memory_kib: 1024,
                hash_iterations: 1,
                hash_parallelism: 1,
                ..AuthConfig::default()
            },
            ..AppConfig::default()
        };
        config.validate().expect("test config should be valid");

        let config = Arc::new(config);
        let stores = Stores::memory();
        let state = ddup_api::app::build_state(Arc::clone(&config), stores.clone())
            .expect("Failed to build state");

        Self {
            router: ddup_api::build_app(state),
            stores,
            config,
        }
    }

    /// Register a user and return their ID
    pub async fn create_test_user(&self, username: &str, password: &str) -> i64 {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({
                    "username": username,
                    "password": password,
                })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );

        response.body["data"]["id"]
            .as_i64()
            .expect("No id in register response")
    }

    /// Login and return the bearer token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self.try_login(username, password).await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Attempt a login and return the raw response
    pub async fn try_login(&self, username: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": username,
                "password": password,
            })),
            None,
        )
        .await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let authorization = token.map(|t| format!("Bearer {t}"));
        self.request_with_authorization(method, path, body, authorization.as_deref())
            .await
    }

    /// Make an HTTP request with a literal `Authorization` header value
    pub async fn request_with_authorization(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        authorization: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(value) = authorization {
            req = req.header("Authorization", value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Flip the first character of a token's signature segment.
pub fn tamper_signature(token: &str) -> String {
    let (head, signature) = token.rsplit_once('.').expect("three segments");
    let mut chars: Vec<char> = signature.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    format!("{head}.{}", chars.into_iter().collect::<String>())
}
