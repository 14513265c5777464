//! Shared test fixtures
//!
//! Builds the full router over an in-memory store with a bootstrap admin,
//! plus helpers for logging in and creating accounts through the API.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::Duration;
use serde_json::{json, Value};
use siteauth::backend::auth::InMemoryCredentialStore;
use siteauth::backend::server::build_app;
use siteauth::shared::{AppConfig, BootstrapAdmin};

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password-1";

/// Config with cheap bcrypt and the default lockout policy
pub fn test_config() -> AppConfig {
    test_config_with_threshold(5)
}

pub fn test_config_with_threshold(threshold: u32) -> AppConfig {
    AppConfig::builder()
        .jwt_secret(SECRET)
        .bcrypt_cost(4)
        .hash_workers(4)
        .lockout_threshold(threshold)
        .lockout_duration(Duration::minutes(30))
        .bootstrap_admin(BootstrapAdmin {
            username: ADMIN_USERNAME.into(),
            email: ADMIN_EMAIL.into(),
            password: ADMIN_PASSWORD.into(),
        })
        .build()
        .expect("valid test config")
}

pub async fn test_server() -> TestServer {
    test_server_with_store(test_config()).await.0
}

pub async fn test_server_with_store(config: AppConfig) -> (TestServer, Arc<InMemoryCredentialStore>) {
    let store = Arc::new(InMemoryCredentialStore::new());
    let app = build_app(store.clone(), config)
        .await
        .expect("app builds");
    (TestServer::new(app).expect("test server"), store)
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Log in and return the bearer token, asserting success
pub async fn login(server: &TestServer, identity: &str, password: &str) -> String {
    let response = server
        .post("/login")
        .json(&json!({ "identity": identity, "password": password }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["token"].as_str().expect("token in response").to_string()
}

pub async fn admin_token(server: &TestServer) -> String {
    login(server, ADMIN_USERNAME, ADMIN_PASSWORD).await
}

/// Create an editor through the admin API, returning its `AccountView`
pub async fn create_editor(server: &TestServer, admin_token: &str, username: &str, password: &str) -> Value {
    let response = server
        .post("/users")
        .add_header(AUTHORIZATION, auth_header(admin_token))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": password,
            "role": "editor"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}
