/**
 * Server Initialization
 *
 * Builds the Axum application from an `AppConfig`.
 *
 * # Initialization Process
 *
 * 1. Load the credential store (PostgreSQL or in-memory)
 * 2. Build the authentication service
 * 3. Provision the bootstrap admin, if configured
 * 4. Create and configure the router
 */

use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use thiserror::Error;

use crate::backend::auth::errors::AuthError;
use crate::backend::auth::store::{CredentialStore, StoreError};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_store;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Startup failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("credential store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("bootstrap admin provisioning failed: {0}")]
    Bootstrap(#[from] AuthError),
}

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails if the configured database is unreachable or the bootstrap admin
/// cannot be created (for example, its password violates the policy).
pub async fn create_app(config: AppConfig) -> Result<Router<()>, InitError> {
    tracing::info!("Initializing siteauth backend server");

    let store = load_store(&config).await?;
    build_app(store, config).await
}

/// Build the application over an existing store
pub async fn build_app(
    store: Arc<dyn CredentialStore>,
    config: AppConfig,
) -> Result<Router<()>, InitError> {
    let state = AppState::new(store, config);

    if let Some(admin) = &state.config.bootstrap_admin {
        state.auth.ensure_bootstrap_admin(admin, Utc::now()).await?;
    }

    tracing::info!(
        "Lockout policy: {} attempts, {} second lock",
        state.auth.policy().threshold,
        state.auth.policy().lock_duration.num_seconds()
    );

    Ok(create_router(state))
}
