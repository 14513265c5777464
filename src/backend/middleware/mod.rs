//! Middleware Module
//!
//! HTTP middleware for the backend server.
//!
//! - **`auth`** - Session and admin-role gates for protected routes
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{middleware, Router};
//! use siteauth::backend::middleware::{admin_middleware, session_middleware};
//! use siteauth::backend::server::state::AppState;
//!
//! fn protect(router: Router<AppState>, state: AppState) -> Router<AppState> {
//!     router
//!         .layer(middleware::from_fn(admin_middleware))
//!         .layer(middleware::from_fn_with_state(state, session_middleware))
//! }
//! ```

pub mod auth;

pub use auth::{admin_middleware, session_middleware, AuthSession};
