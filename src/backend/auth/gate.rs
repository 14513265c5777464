//! Authorization gate.
//!
//! Framework-free session and role checks. The axum middleware in
//! `backend::middleware::auth` wraps these; handlers never parse headers
//! themselves.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::auth::accounts::Role;
use crate::backend::auth::errors::AuthError;
use crate::backend::auth::sessions::TokenService;

/// Authenticated caller, derived from a verified token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account_id: Uuid,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// Pull the token out of an `Authorization: Bearer <token>` value
fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Verify the bearer token in `authorization` and build a `Session`
///
/// Every failure (missing header, wrong scheme, expired or invalid token) is
/// `AuthError::Unauthorized`.
pub fn require_session(
    tokens: &TokenService,
    authorization: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Session, AuthError> {
    let token = authorization
        .and_then(bearer_token)
        .ok_or(AuthError::Unauthorized)?;

    let claims = tokens
        .verify(token, now)
        .map_err(|e| {
            tracing::warn!("Rejected session token: {}", e);
            e.into_session_error()
        })?;

    Ok(Session {
        account_id: claims.account_id,
        role: claims.role,
        expires_at: claims.expires_at,
    })
}

/// Require an established session holding exactly `role`
pub fn require_role(session: Option<&Session>, role: Role) -> Result<&Session, AuthError> {
    let session = session.ok_or(AuthError::Unauthorized)?;
    if session.role != role {
        tracing::warn!(
            "Account {} with role {} denied {}-only operation",
            session.account_id,
            session.role,
            role
        );
        return Err(AuthError::Forbidden);
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::accounts::Account;
    use assert_matches::assert_matches;
    use chrono::Duration;

    fn tokens() -> TokenService {
        TokenService::new(b"0123456789abcdef0123456789abcdef", Duration::hours(1))
    }

    fn token_for(tokens: &TokenService, role: Role, now: DateTime<Utc>) -> (Uuid, String) {
        let account = Account {
            id: Uuid::new_v4(),
            username: "grace".into(),
            email: "grace@example.com".into(),
            password_hash: String::new(),
            role,
            is_active: true,
            failed_attempts: 0,
            locked_until: None,
            created_at: now,
            updated_at: now,
        };
        (account.id, tokens.issue(&account, now).unwrap().token)
    }

    #[test]
    fn test_bearer_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer   abc  "), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn test_require_session() {
        let tokens = tokens();
        let now = Utc::now();
        let (id, token) = token_for(&tokens, Role::Editor, now);
        let header = format!("Bearer {}", token);

        let session = require_session(&tokens, Some(&header), now).unwrap();
        assert_eq!(session.account_id, id);
        assert_eq!(session.role, Role::Editor);
    }

    #[test]
    fn test_require_session_failures_are_unauthorized() {
        let tokens = tokens();
        let now = Utc::now();
        let (_, token) = token_for(&tokens, Role::Editor, now);
        let header = format!("Bearer {}", token);

        assert_matches!(require_session(&tokens, None, now), Err(AuthError::Unauthorized));
        assert_matches!(
            require_session(&tokens, Some("Bearer garbage"), now),
            Err(AuthError::Unauthorized)
        );
        assert_matches!(
            require_session(&tokens, Some(&header), now + Duration::hours(2)),
            Err(AuthError::Unauthorized)
        );
    }

    #[test]
    fn test_require_role() {
        let now = Utc::now();
        let editor = Session {
            account_id: Uuid::new_v4(),
            role: Role::Editor,
            expires_at: now,
        };
        let admin = Session {
            role: Role::Admin,
            ..editor
        };

        assert_matches!(require_role(None, Role::Admin), Err(AuthError::Unauthorized));
        assert_matches!(require_role(Some(&editor), Role::Admin), Err(AuthError::Forbidden));
        assert_eq!(require_role(Some(&admin), Role::Admin).unwrap(), &admin);
    }
}
