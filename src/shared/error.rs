//! Shared Error Types
//!
//! Errors produced while checking request input before it reaches the
//! authentication core. They are independent of the HTTP layer so the core
//! services can return them too (password policy, username rules).
//!
//! # Error Categories
//!
//! - `MalformedBody` - the body could not be decoded into the expected schema
//! - `ValidationError` - a decoded field violates a rule
//!
//! # Usage
//!
//! ```rust
//! use siteauth::shared::error::SharedError;
//!
//! let error = SharedError::validation("password", "Password must be at least 8 characters");
//! ```
use thiserror::Error;

/// Input errors shared by the HTTP boundary and the core services
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Body is not valid JSON or does not match the schema
    #[error("Malformed request body: {message}")]
    MalformedBody {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new malformed body error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedBody {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
