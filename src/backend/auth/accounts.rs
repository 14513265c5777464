/**
 * Account Model
 *
 * Account records as the authentication core sees them, the closed role set,
 * and the lock state derived from an account's counter fields.
 *
 * The password hash lives on `Account` but never leaves the backend:
 * everything returned to clients goes through `AccountView`.
 */

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::SharedError;

/// Authorization role
///
/// Closed set: anything else is rejected when parsed, never mapped to a
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Editor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is outside the closed set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Account record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique account ID (UUID)
    pub id: Uuid,
    /// Username (unique, 3-30 chars, alphanumeric + underscore)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    /// Consecutive failed login attempts
    pub failed_attempts: u32,
    /// Logins are refused until this instant
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lock state of an account at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Logins allowed; `attempts` failures recorded so far
    Unlocked { attempts: u32 },
    /// Logins refused until `until`
    Locked { until: DateTime<Utc> },
    /// A lock is recorded but `until` has passed; must be cleared before use
    Expired { until: DateTime<Utc> },
}

impl Account {
    pub fn lock_state(&self, now: DateTime<Utc>) -> LockState {
        match self.locked_until {
            Some(until) if until > now => LockState::Locked { until },
            Some(until) => LockState::Expired { until },
            None => LockState::Unlocked {
                attempts: self.failed_attempts,
            },
        }
    }

    pub fn view(&self) -> AccountView {
        AccountView::from(self)
    }
}

/// Values required to insert a new account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
}

/// Administrative changes to an account; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Account as returned to clients (no password hash, no counters)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
            is_active: account.is_active,
            locked_until: account.locked_until,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Validate username format
///
/// Usernames must be:
/// - 3-30 characters long
/// - Contain only alphanumeric characters and underscores
/// - Start with a letter
pub fn validate_username(username: &str) -> Result<(), SharedError> {
    let invalid = || {
        SharedError::validation(
            "username",
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        )
    };

    if username.len() < 3 || username.len() > 30 {
        return Err(invalid());
    }

    let mut chars = username.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(invalid()),
    }

    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Basic email format check
pub fn validate_email(email: &str) -> Result<(), SharedError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid && email.len() <= 254 {
        Ok(())
    } else {
        Err(SharedError::validation("email", "Invalid email format"))
    }
}
