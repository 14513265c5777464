/**
 * Backend Error Types
 *
 * The single adapter between core errors and HTTP. Handlers and middleware
 * return `BackendError`; each variant of `AuthError` maps to exactly one
 * status code and one fixed message.
 *
 * # Status Code Mapping
 *
 * | AuthError            | Status |
 * |----------------------|--------|
 * | `InvalidCredentials` | 401    |
 * | `AccountLocked`      | 423    |
 * | `TokenExpired`       | 401    |
 * | `TokenInvalid`       | 401    |
 * | `Unauthorized`       | 401    |
 * | `Forbidden`          | 403    |
 * | `Validation`         | 400    |
 * | `NotFound`           | 404    |
 * | `Conflict`           | 409    |
 * | internal failures    | 500    |
 *
 * Credential-related messages never say which check failed, and 500-class
 * messages never include the underlying error.
 */

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::backend::auth::errors::AuthError;
use crate::backend::auth::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from the authentication core
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Handler error with an explicit status (e.g. unmatched route input)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },
}

impl From<SharedError> for BackendError {
    fn from(err: SharedError) -> Self {
        Self::Auth(AuthError::Validation(err))
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        Self::Auth(AuthError::from(err))
    }
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::TokenExpired
                | AuthError::TokenInvalid
                | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
                AuthError::AccountLocked { .. } => StatusCode::LOCKED,
                AuthError::Forbidden => StatusCode::FORBIDDEN,
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::NotFound => StatusCode::NOT_FOUND,
                AuthError::Conflict(_) => StatusCode::CONFLICT,
                AuthError::Store(_)
                | AuthError::Hashing(_)
                | AuthError::Signing(_)
                | AuthError::LockExpiryOutOfRange => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Client-facing message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::AccountLocked { .. } => {
                    "Account temporarily locked due to repeated failed logins".to_string()
                }
                AuthError::TokenExpired | AuthError::TokenInvalid | AuthError::Unauthorized => {
                    "Unauthorized".to_string()
                }
                AuthError::Forbidden => "Forbidden".to_string(),
                AuthError::Validation(shared) => match shared {
                    SharedError::MalformedBody { .. } => "Malformed request body".to_string(),
                    SharedError::ValidationError { message, .. } => message.clone(),
                },
                AuthError::NotFound => "Account not found".to_string(),
                AuthError::Conflict(field) => format!("An account with this {} already exists", field),
                AuthError::Store(_)
                | AuthError::Hashing(_)
                | AuthError::Signing(_)
                | AuthError::LockExpiryOutOfRange => {
                    "Internal server error".to_string()
                }
            },
        }
    }

    /// Offending field for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Auth(AuthError::Validation(SharedError::ValidationError { field, .. })) => {
                Some(field)
            }
            _ => None,
        }
    }

    /// Whole seconds until a locked account accepts logins again
    ///
    /// Rounded up and never below one, so a client waiting this long is not
    /// refused again.
    pub fn retry_after(&self, now: DateTime<Utc>) -> Option<u64> {
        match self {
            Self::Auth(AuthError::AccountLocked { until }) => {
                let millis = (*until - now).num_milliseconds().max(0) as u64;
                Some(millis.div_ceil(1000).max(1))
            }
            _ => None,
        }
    }
}
