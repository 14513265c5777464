/**
 * Login Handler
 *
 * POST /login
 *
 * # Authentication Process
 *
 * 1. Look up the account by username or email
 * 2. Refuse without hashing if the account is locked
 * 3. Verify the password with bcrypt
 * 4. Record the failure (possibly locking) or reset the counter
 * 5. Return a JWT token
 *
 * # Security
 *
 * - Unknown identity, inactive account and wrong password share one 401
 * - A locked account answers 423 with `Retry-After`
 * - Passwords are never logged or returned
 */

use axum::{extract::State, response::Json};
use chrono::Utc;

use crate::backend::auth::handlers::types::{LoginRequest, LoginResponse, ValidatedJson};
use crate::backend::auth::service::AuthService;
use crate::backend::error::BackendError;

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - Malformed body or blank fields
/// * `401 Unauthorized` - Unknown identity or wrong password
/// * `423 Locked` - Too many failed attempts; retry after the lock expires
/// * `500 Internal Server Error` - Store, hashing or signing failure
///
/// # Example Request
///
/// ```http
/// POST /login HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "identity": "editor@example.com",
///   "password": "securepassword123"
/// }
/// ```
///
/// # Example Response
///
/// ```json
/// {
///   "token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
///   "expires_at": "2025-01-01T08:00:00Z",
///   "identity": "editor",
///   "role": "editor"
/// }
/// ```
pub async fn login(
    State(auth): State<AuthService>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, BackendError> {
    tracing::info!(identity = ?request.identity, "Login request");

    let outcome = auth
        .login(request.identity.trim(), &request.password, Utc::now())
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token.token,
        expires_at: outcome.token.expires_at,
        identity: outcome.account.username,
        role: outcome.account.role,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::{InMemoryCredentialStore, LockoutPolicy, PasswordHasher, TokenService};
    use chrono::Duration;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_identity_is_escaped_in_logs() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let auth = AuthService::new(
            Arc::new(InMemoryCredentialStore::new()),
            PasswordHasher::new(4, 1),
            TokenService::new(b"login-handler-test-secret-0123456789", Duration::hours(1)),
            LockoutPolicy::default(),
        );
        let request = LoginRequest {
            identity: "nobody\nINFO forged entry".to_string(),
            password: "irrelevant-password".to_string(),
        };

        let result = login(State(auth), ValidatedJson(request)).await;
        assert!(result.is_err());

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains(r#"identity="nobody\nINFO forged entry""#));
        assert!(!output.contains("nobody\nINFO"));
    }
}
