//! Backend Error Module
//!
//! HTTP-facing error type. Core operations return `AuthError`; handlers and
//! middleware lift it into `BackendError`, which renders as a JSON response.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - BackendError and the status mapping
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use siteauth::backend::error::BackendError;
//! use siteauth::backend::auth::AuthError;
//!
//! async fn handler() -> Result<&'static str, BackendError> {
//!     Err(AuthError::Forbidden.into())
//! }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
