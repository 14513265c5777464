/**
 * Authentication Middleware
 *
 * Axum adapters for the authorization gate. `session_middleware` verifies
 * the bearer token and stores the resulting `Session` in request
 * extensions; `admin_middleware` must be layered inside it and rejects
 * non-admin sessions. Handlers read the session back with the `AuthSession`
 * extractor.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::backend::auth::accounts::Role;
use crate::backend::auth::errors::AuthError;
use crate::backend::auth::gate::{require_role, require_session, Session};
use crate::backend::auth::service::AuthService;
use crate::backend::error::BackendError;

/// Session middleware
///
/// 1. Reads the `Authorization` header
/// 2. Verifies the bearer token
/// 3. Attaches the `Session` to request extensions
///
/// Returns 401 Unauthorized if the token is missing, expired or invalid.
pub async fn session_middleware(
    State(auth): State<AuthService>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let session = require_session(auth.tokens(), header, Utc::now())?;
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Admin middleware
///
/// Requires a session established by `session_middleware` with the admin
/// role. Returns 401 without a session and 403 for any other role.
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, BackendError> {
    require_role(request.extensions().get::<Session>(), Role::Admin)?;
    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated session
#[derive(Clone, Copy, Debug)]
pub struct AuthSession(pub Session);

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<Session>().copied().ok_or_else(|| {
            tracing::warn!("Session not found in request extensions");
            BackendError::from(AuthError::Unauthorized)
        })?;

        Ok(AuthSession(session))
    }
}
