/**
 * Authentication Handler Types
 *
 * Request and response bodies for the authentication and user-management
 * endpoints, plus the `Validate` trait and the `ValidatedJson` extractor
 * that decode and check a body once at the boundary.
 *
 * Unknown fields are rejected so a typo in a request is a 400, not a
 * silently ignored value.
 */

use axum::extract::{FromRequest, FromRequestParts, Json, Path, Request};
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::auth::accounts::{Account, AccountUpdate, Role};
use crate::backend::error::BackendError;
use crate::shared::SharedError;

/// Shape checks a request body performs after decoding
pub trait Validate {
    fn validate(&self) -> Result<(), SharedError>;
}

/// JSON body extractor that rejects malformed or invalid input with 400
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::warn!("Rejected request body: {}", e.body_text());
            BackendError::from(SharedError::malformed(e.body_text()))
        })?;

        value.validate().map_err(|e| {
            tracing::warn!("Request validation failed: {}", e);
            BackendError::from(e)
        })?;

        Ok(ValidatedJson(value))
    }
}

/// `{id}` path segment of the `/users` routes
///
/// A segment that is not a UUID is a 400 with the usual JSON error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountId(pub Uuid);

impl<S> FromRequestParts<S> for AccountId
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state).await.map_err(|e| {
            tracing::warn!("Rejected account id: {}", e.body_text());
            BackendError::from(SharedError::validation("id", "Invalid account id"))
        })?;
        Ok(AccountId(id))
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), SharedError> {
    if value.trim().is_empty() {
        return Err(SharedError::validation(field, format!("{} is required", field)));
    }
    Ok(())
}

/// Login request
///
/// `identity` is a username or an email address.
#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub identity: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), SharedError> {
        require_non_empty("identity", &self.identity)?;
        require_non_empty("password", &self.password)
    }
}

/// Login response
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Username of the authenticated account
    pub identity: String,
    pub role: Role,
}

/// Current session's account
#[derive(Serialize, Deserialize, Debug)]
pub struct MeResponse {
    pub id: Uuid,
    /// Same as `username`; kept for clients that only read `identity`
    pub identity: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&Account> for MeResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            identity: account.username.clone(),
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl Validate for ChangePasswordRequest {
    fn validate(&self) -> Result<(), SharedError> {
        require_non_empty("current_password", &self.current_password)?;
        require_non_empty("new_password", &self.new_password)
    }
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

impl Validate for ResetPasswordRequest {
    fn validate(&self) -> Result<(), SharedError> {
        require_non_empty("new_password", &self.new_password)
    }
}

/// Admin account creation
#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), SharedError> {
        require_non_empty("username", &self.username)?;
        require_non_empty("email", &self.email)?;
        require_non_empty("password", &self.password)
    }
}

/// Admin account edit; absent fields are left unchanged
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), SharedError> {
        if self.username.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
        {
            return Err(SharedError::validation("body", "No fields to update"));
        }
        Ok(())
    }
}

impl From<UpdateUserRequest> for AccountUpdate {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            role: request.role,
            is_active: request.is_active,
        }
    }
}

/// Plain acknowledgement body
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_rejects_blank_fields() {
        let request = LoginRequest {
            identity: "  ".into(),
            password: "secret".into(),
        };
        assert!(request.validate().is_err());

        let request = LoginRequest {
            identity: "alice".into(),
            password: "secret".into(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let body = r#"{"identity":"alice","password":"x","remember":true}"#;
        assert!(serde_json::from_str::<LoginRequest>(body).is_err());
    }

    #[test]
    fn test_create_user_defaults_active() {
        let body = r#"{"username":"alice","email":"a@x.com","password":"password1","role":"editor"}"#;
        let request: CreateUserRequest = serde_json::from_str(body).unwrap();
        assert!(request.is_active);
        assert_eq!(request.role, Role::Editor);
    }

    #[test]
    fn test_create_user_rejects_unknown_role() {
        let body = r#"{"username":"alice","email":"a@x.com","password":"password1","role":"owner"}"#;
        assert!(serde_json::from_str::<CreateUserRequest>(body).is_err());
    }

    #[test]
    fn test_empty_update_rejected() {
        assert!(UpdateUserRequest::default().validate().is_err());
        let update = UpdateUserRequest {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        assert_eq!(AccountUpdate::from(update).is_active, Some(false));
    }
}
