//! Server Module
//!
//! Application state, store selection and application assembly.
//!
//! # Initialization Flow
//!
//! 1. **Store Selection**: PostgreSQL when `DATABASE_URL` is set, otherwise in-memory
//! 2. **State Creation**: `AppState` wraps the `AuthService` built from `AppConfig`
//! 3. **Bootstrap**: Creates the configured first admin if missing
//! 4. **Router Creation**: Configures all routes and middleware
//!
//! # Example
//!
//! ```rust,no_run
//! use siteauth::backend::server::create_app;
//! use siteauth::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let app = create_app(config).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Credential store selection
pub mod config;

/// Server initialization
pub mod init;

pub use init::{build_app, create_app, InitError};
pub use state::AppState;
