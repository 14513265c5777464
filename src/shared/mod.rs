//! Shared Module
//!
//! Types that are not tied to the HTTP server: the application configuration
//! and the input validation errors used by both the request boundary and the
//! authentication services.

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, BootstrapAdmin, ConfigError};
