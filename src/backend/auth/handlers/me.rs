/**
 * Get Current User Handler
 *
 * GET /me, behind `session_middleware`. Returns the account behind the
 * bearer token without sensitive data.
 */

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::MeResponse;
use crate::backend::auth::service::AuthService;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthSession;

/// Get current user handler
///
/// # Errors
///
/// * `401 Unauthorized` - No valid session, or the account was deleted or
///   deactivated after the token was issued
///
/// # Example Response
///
/// ```json
/// {
///   "id": "123e4567-e89b-12d3-a456-426614174000",
///   "identity": "editor",
///   "username": "editor",
///   "email": "editor@example.com",
///   "role": "editor"
/// }
/// ```
pub async fn get_me(
    State(auth): State<AuthService>,
    AuthSession(session): AuthSession,
) -> Result<Json<MeResponse>, BackendError> {
    let account = auth.current_account(&session).await?;
    Ok(Json(MeResponse::from(&account)))
}
