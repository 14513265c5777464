/**
 * User Management Handlers
 *
 * Admin-only account CRUD, mounted behind `session_middleware` and
 * `admin_middleware`:
 *
 * - `GET    /users`                     - list accounts
 * - `POST   /users`                     - create an account
 * - `GET    /users/{id}`                - fetch one account
 * - `PUT    /users/{id}`                - edit username, email, role, active flag
 * - `DELETE /users/{id}`                - delete an account
 * - `POST   /users/{id}/reset-password` - set a new password, clearing any lock
 *
 * Responses use `AccountView`; password hashes and counters never leave
 * the server.
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::Utc;

use crate::backend::auth::accounts::AccountView;
use crate::backend::auth::handlers::types::{
    AccountId, CreateUserRequest, MessageResponse, ResetPasswordRequest, UpdateUserRequest,
    ValidatedJson,
};
use crate::backend::auth::service::{AuthService, CreateAccount};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthSession;

pub async fn list_users(
    State(auth): State<AuthService>,
) -> Result<Json<Vec<AccountView>>, BackendError> {
    let accounts = auth.list_accounts().await?;
    Ok(Json(accounts.iter().map(AccountView::from).collect()))
}

/// # Errors
///
/// * `400 Bad Request` - Invalid username, email or password
/// * `409 Conflict` - Username or email already taken
pub async fn create_user(
    State(auth): State<AuthService>,
    AuthSession(session): AuthSession,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<AccountView>), BackendError> {
    tracing::info!("Admin {} creating account {}", session.account_id, request.username);

    let account = auth
        .create_account(
            CreateAccount {
                username: request.username,
                email: request.email,
                password: request.password,
                role: request.role,
                is_active: request.is_active,
            },
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(account.view())))
}

pub async fn get_user(
    State(auth): State<AuthService>,
    AccountId(id): AccountId,
) -> Result<Json<AccountView>, BackendError> {
    let account = auth.get_account(id).await?;
    Ok(Json(account.view()))
}

/// # Errors
///
/// * `400 Bad Request` - Invalid field, or an admin deactivating/demoting themselves
/// * `404 Not Found` - Unknown id
/// * `409 Conflict` - New username or email already taken
pub async fn update_user(
    State(auth): State<AuthService>,
    AuthSession(session): AuthSession,
    AccountId(id): AccountId,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<AccountView>, BackendError> {
    let account = auth
        .update_account(&session, id, request.into(), Utc::now())
        .await?;
    Ok(Json(account.view()))
}

pub async fn delete_user(
    State(auth): State<AuthService>,
    AuthSession(session): AuthSession,
    AccountId(id): AccountId,
) -> Result<StatusCode, BackendError> {
    auth.delete_account(&session, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_password(
    State(auth): State<AuthService>,
    AuthSession(session): AuthSession,
    AccountId(id): AccountId,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, BackendError> {
    auth.admin_reset_password(&session, id, &request.new_password, Utc::now())
        .await?;
    Ok(Json(MessageResponse::new("Password reset")))
}
