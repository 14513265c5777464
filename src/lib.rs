//! siteauth - Authentication and Account Protection
//!
//! The authentication core of a content-management backend: credential
//! verification, brute-force lockout, bearer session tokens and role-gated
//! user management, served over Axum.
//!
//! # Module Structure
//!
//! - **`shared`** - Configuration and input error types used across layers
//! - **`backend`** - Authentication core and HTTP server
//!
//! # Usage
//!
//! ```rust,no_run
//! use siteauth::backend::server::create_app;
//! use siteauth::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(config).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` and `shared::ConfigError` for input and configuration
//! - `backend::auth::AuthError` for every core operation
//! - `backend::error::BackendError` at the HTTP boundary

/// Shared types and configuration
pub mod shared;

/// Backend server-side code
pub mod backend;
