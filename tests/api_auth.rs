//! Authentication API integration tests
//!
//! Login, lockout, current-user and password-change endpoints driven
//! through the full router.

mod support;

use axum::http::header::{AUTHORIZATION, RETRY_AFTER};
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use siteauth::backend::auth::CredentialStore;
use siteauth::shared::{AppConfig, BootstrapAdmin};
use support::*;

#[tokio::test]
async fn test_health() {
    let server = test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_login_success_by_username_and_email() {
    let server = test_server().await;

    for identity in [ADMIN_USERNAME, ADMIN_EMAIL] {
        let response = server
            .post("/login")
            .json(&json!({ "identity": identity, "password": ADMIN_PASSWORD }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(body["expires_at"].is_string());
        assert_eq!(body["identity"], ADMIN_USERNAME);
        assert_eq!(body["role"], "admin");
        assert!(body.get("password_hash").is_none());
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let server = test_server().await;

    let wrong_password = server
        .post("/login")
        .json(&json!({ "identity": ADMIN_USERNAME, "password": "not-the-password" }))
        .await;
    let unknown = server
        .post("/login")
        .json(&json!({ "identity": "ghost", "password": "not-the-password" }))
        .await;

    assert_eq!(wrong_password.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.json::<Value>(), unknown.json::<Value>());
}

#[tokio::test]
async fn test_login_malformed_body() {
    let server = test_server().await;

    let missing_field = server
        .post("/login")
        .json(&json!({ "identity": ADMIN_USERNAME }))
        .await;
    missing_field.assert_status(StatusCode::BAD_REQUEST);

    let blank = server
        .post("/login")
        .json(&json!({ "identity": "", "password": "x" }))
        .await;
    blank.assert_status(StatusCode::BAD_REQUEST);

    let not_json = server.post("/login").text("identity=admin").await;
    not_json.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lockout_after_threshold() {
    let server = test_server().await;
    let admin = admin_token(&server).await;
    create_editor(&server, &admin, "writer", "writer-password").await;

    for _ in 0..4 {
        server
            .post("/login")
            .json(&json!({ "identity": "writer@example.com", "password": "wrong-password" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    let fifth = server
        .post("/login")
        .json(&json!({ "identity": "writer@example.com", "password": "wrong-password" }))
        .await;
    fifth.assert_status(StatusCode::LOCKED);
    let retry: u64 = fifth.header(RETRY_AFTER).to_str().unwrap().parse().unwrap();
    assert!(retry > 0 && retry <= 1800);

    // Correct password is refused while the lock holds.
    server
        .post("/login")
        .json(&json!({ "identity": "writer", "password": "writer-password" }))
        .await
        .assert_status(StatusCode::LOCKED);
}

#[tokio::test]
async fn test_successful_login_resets_counter() {
    let (server, store) = test_server_with_store(test_config()).await;
    let admin = admin_token(&server).await;
    create_editor(&server, &admin, "writer", "writer-password").await;

    for _ in 0..4 {
        server
            .post("/login")
            .json(&json!({ "identity": "writer", "password": "wrong-password" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
    login(&server, "writer", "writer-password").await;

    let account = store.find_by_identity("writer").await.unwrap().unwrap();
    assert_eq!(account.failed_attempts, 0);

    // A fresh cycle needs the full threshold again.
    for _ in 0..4 {
        server
            .post("/login")
            .json(&json!({ "identity": "writer", "password": "wrong-password" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_me_requires_session() {
    let server = test_server().await;

    server.get("/me").await.assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/me")
        .add_header(AUTHORIZATION, "Bearer not-a-token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/me")
        .add_header(AUTHORIZATION, "Basic YWRtaW46cGFzcw==")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_account() {
    let server = test_server().await;
    let token = admin_token(&server).await;

    let response = server
        .get("/me")
        .add_header(AUTHORIZATION, auth_header(&token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["identity"], ADMIN_USERNAME);
    assert_eq!(body["username"], ADMIN_USERNAME);
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert_eq!(body["role"], "admin");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let server = test_server().await;
    let other_config = AppConfig::builder()
        .jwt_secret("a-completely-different-secret-value!!")
        .bcrypt_cost(4)
        .bootstrap_admin(BootstrapAdmin {
            username: ADMIN_USERNAME.into(),
            email: ADMIN_EMAIL.into(),
            password: ADMIN_PASSWORD.into(),
        })
        .build()
        .unwrap();
    let (other, _) = test_server_with_store(other_config).await;
    let foreign = admin_token(&other).await;

    server
        .get("/me")
        .add_header(AUTHORIZATION, auth_header(&foreign))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_flow() {
    let (server, store) = test_server_with_store(test_config()).await;
    let admin = admin_token(&server).await;
    create_editor(&server, &admin, "writer", "writer-password").await;
    let token = login(&server, "writer", "writer-password").await;

    let before = store.find_by_identity("writer").await.unwrap().unwrap();

    // Wrong current password: 401, counted, hash unchanged.
    server
        .put("/change-password")
        .add_header(AUTHORIZATION, auth_header(&token))
        .json(&json!({ "current_password": "wrong-password", "new_password": "another-password" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    let after = store.find_by_identity("writer").await.unwrap().unwrap();
    assert_eq!(after.password_hash, before.password_hash);
    assert_eq!(after.failed_attempts, 1);

    // Policy violation: 400.
    server
        .put("/change-password")
        .add_header(AUTHORIZATION, auth_header(&token))
        .json(&json!({ "current_password": "writer-password", "new_password": "short" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .put("/change-password")
        .add_header(AUTHORIZATION, auth_header(&token))
        .json(&json!({ "current_password": "writer-password", "new_password": "another-password" }))
        .await
        .assert_status_ok();

    login(&server, "writer", "another-password").await;
    server
        .post("/login")
        .json(&json!({ "identity": "writer", "password": "writer-password" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_requires_session() {
    let server = test_server().await;
    server
        .put("/change-password")
        .json(&json!({ "current_password": "a-password", "new_password": "b-password" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = test_server().await;
    server.get("/nope").await.assert_status(StatusCode::NOT_FOUND);
}
