//! Shared test helpers for integration tests.
//!
//! Every `TestApp` runs the full router over a fresh in-memory store and
//! verifies tokens against the fixture key pair.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use planner_api::{AppState, build_app};
use planner_auth::{KeyCache, VerificationKey};
use planner_core::config::AppConfig;
use planner_database::{MemoryStore, Stores};

const SIGNING_PEM: &str = include_str!("../../fixtures/keys/signing.pem");
const VERIFY_PEM: &str = include_str!("../../fixtures/keys/verify_pkix.pem");
const ROGUE_SIGNING_PEM: &str = include_str!("../../fixtures/keys/rogue_signing.pem");

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
}

/// A principal with a signed bearer token.
#[derive(Debug, Clone)]
pub struct TestUser {
    /// Subject claim.
    pub id: Uuid,
    /// Email claim.
    pub email: String,
    /// Signed RS256 token.
    pub token: String,
}

impl TestApp {
    /// Create a test application with rate limiting off.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.server.rate_limit.enabled = false;
        Self::with_config(config)
    }

    /// Create a test application from an explicit configuration.
    pub fn with_config(config: AppConfig) -> Self {
        let key = VerificationKey::from_pem(VERIFY_PEM).expect("fixture key");
        let keys = Arc::new(KeyCache::new(key));
        let stores = Stores::memory(MemoryStore::new());
        let state = AppState::new(config.clone(), stores, keys, None);
        Self {
            router: build_app(state),
            config,
        }
    }

    /// Make a JSON request against the router.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let body = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();
        let req = req.body(Body::from(body)).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Request as `user`.
    pub async fn as_user(
        &self,
        user: &TestUser,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> TestResponse {
        self.request(method, path, body, Some(&user.token)).await
    }

    /// Create an organization owned by `owner` and return its id.
    pub async fn create_organization(&self, owner: &TestUser, name: &str) -> String {
        let response = self
            .as_user(owner, "POST", "/api/organizations", Some(json!({ "name": name })))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_str().expect("org id").to_string()
    }

    /// Invite `user` with `role` and accept on their behalf.
    pub async fn add_member(&self, owner: &TestUser, org: &str, user: &TestUser, role: &str) {
        let invite = self
            .as_user(
                owner,
                "POST",
                &format!("/api/organizations/{org}/members"),
                Some(json!({ "email": user.email, "role": role })),
            )
            .await;
        assert_eq!(invite.status, StatusCode::CREATED, "{:?}", invite.body);
        let token = invite.body["token"].as_str().expect("invitation token");

        let accept = self
            .as_user(user, "POST", &format!("/api/invitations/{token}/accept"), None)
            .await;
        assert_eq!(accept.status, StatusCode::OK, "{:?}", accept.body);
    }

    /// Create a floor plan and return its id.
    pub async fn create_plan(&self, user: &TestUser, name: &str, org: Option<&str>) -> String {
        let response = self
            .as_user(
                user,
                "POST",
                "/api/floor-plans",
                Some(json!({ "name": name, "organizationId": org })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_str().expect("plan id").to_string()
    }
}

impl TestUser {
    /// A user with a token valid for an hour.
    pub fn new(name: &str) -> Self {
        Self::with_expiry(name, Duration::hours(1))
    }

    /// A user whose token expires `ttl` from now (negative for expired).
    pub fn with_expiry(name: &str, ttl: Duration) -> Self {
        let id = Uuid::new_v4();
        let email = format!("{name}@example.com");
        let token = sign(SIGNING_PEM, id, &email, ttl);
        Self { id, email, token }
    }

    /// A user whose token is signed by a key the server does not trust.
    pub fn forged(name: &str) -> Self {
        let id = Uuid::new_v4();
        let email = format!("{name}@example.com");
        let token = sign(ROGUE_SIGNING_PEM, id, &email, Duration::hours(1));
        Self { id, email, token }
    }
}

fn sign(pem: &str, sub: Uuid, email: &str, ttl: Duration) -> String {
    let now = Utc::now();
    let claims = json!({
        "sub": sub,
        "email": email,
        "iat": now.timestamp(),
        "exp": (now + ttl).timestamp(),
    });
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture signing key");
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key).expect("sign token")
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}
