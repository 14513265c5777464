//! Authentication error taxonomy.
//!
//! Every core operation returns `Result<_, AuthError>`. Expected failures
//! (wrong password, expired token) are ordinary variants; the HTTP boundary
//! maps each variant to one fixed status code and message.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::backend::auth::store::StoreError;
use crate::shared::SharedError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown identity, inactive account or wrong password
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account locked until {until}")]
    AccountLocked { until: DateTime<Utc> },

    #[error("token expired")]
    TokenExpired,

    /// Malformed token, bad signature or tampered claims
    #[error("token invalid")]
    TokenInvalid,

    /// Missing or unusable session
    #[error("unauthorized")]
    Unauthorized,

    /// Valid session, insufficient role
    #[error("forbidden")]
    Forbidden,

    #[error(transparent)]
    Validation(#[from] SharedError),

    #[error("account not found")]
    NotFound,

    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    /// Lock duration pushes the expiry past the representable time range
    #[error("lock expiry out of range")]
    LockExpiryOutOfRange,
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(field) => Self::Conflict(field),
            other => Self::Store(other),
        }
    }
}

impl AuthError {
    /// Collapse token failures into the session-level `Unauthorized`
    pub fn into_session_error(self) -> Self {
        match self {
            Self::TokenExpired | Self::TokenInvalid => Self::Unauthorized,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_lifted_from_store() {
        let err: AuthError = StoreError::Conflict("email").into();
        assert!(matches!(err, AuthError::Conflict("email")));

        let err: AuthError = StoreError::Poisoned.into();
        assert!(matches!(err, AuthError::Store(StoreError::Poisoned)));
    }

    #[test]
    fn test_token_errors_collapse_to_unauthorized() {
        assert!(matches!(
            AuthError::TokenExpired.into_session_error(),
            AuthError::Unauthorized
        ));
        assert!(matches!(
            AuthError::TokenInvalid.into_session_error(),
            AuthError::Unauthorized
        ));
        assert!(matches!(
            AuthError::Forbidden.into_session_error(),
            AuthError::Forbidden
        ));
    }
}
