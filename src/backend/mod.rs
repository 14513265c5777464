//! Backend Module
//!
//! Server-side code: the authentication core and the Axum HTTP layer
//! around it.
//!
//! # Architecture
//!
//! - **`auth`** - Accounts, credential store, hashing, lockout, tokens, gate, handlers
//! - **`middleware`** - Session and admin gates as Axum middleware
//! - **`error`** - `BackendError` and its HTTP mapping
//! - **`server`** - Application state, store selection, initialization
//! - **`routes`** - Route groups and router assembly
//! - **`logging`** - Tracing subscriber setup for the binaries
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs              - Module exports and documentation
//! ├── main.rs             - Server binary
//! ├── unlock_account.rs   - Offline unlock binary
//! ├── auth/               - Authentication core and handlers
//! ├── middleware/         - Request middleware
//! ├── error/              - Error types
//! ├── server/             - Server initialization and state
//! ├── routes/             - Route configuration
//! └── logging.rs          - Tracing setup
//! ```
//!
//! # Thread Safety
//!
//! The credential store is the only shared mutable state. Everything else
//! in `AppState` is immutable after startup and shared through `Arc`.

/// Authentication and user management
pub mod auth;

/// Backend error types
pub mod error;

/// Middleware for request processing
pub mod middleware;

/// Route configuration
pub mod routes;

/// Server setup and configuration
pub mod server;

pub mod logging;

pub use error::BackendError;
pub use server::create_app;
