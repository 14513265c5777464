/**
 * Change Password Handler
 *
 * PUT /change-password, behind `session_middleware`.
 *
 * The current password is checked under the same lockout rules as a login:
 * a wrong value counts as a failed attempt against the account.
 */

use axum::{extract::State, response::Json};
use chrono::Utc;

use crate::backend::auth::handlers::types::{ChangePasswordRequest, MessageResponse, ValidatedJson};
use crate::backend::auth::service::AuthService;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthSession;

/// # Errors
///
/// * `400 Bad Request` - New password violates the policy
/// * `401 Unauthorized` - Wrong current password or no valid session
/// * `423 Locked` - Account locked by repeated failures
pub async fn change_password(
    State(auth): State<AuthService>,
    AuthSession(session): AuthSession,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, BackendError> {
    auth.change_password(
        session.account_id,
        &request.current_password,
        &request.new_password,
        Utc::now(),
    )
    .await?;

    Ok(Json(MessageResponse::new("Password updated")))
}
