/**
 * Server Configuration
 *
 * Chooses the credential store from configuration.
 *
 * - `DATABASE_URL` set: connect to PostgreSQL and run migrations. A
 *   connection or migration failure is fatal; the server never falls back
 *   to memory when a database was requested.
 * - `DATABASE_URL` unset: in-memory store, with a warning that accounts do
 *   not survive a restart.
 */

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::backend::auth::store::{CredentialStore, InMemoryCredentialStore, PgCredentialStore, StoreError};
use crate::shared::AppConfig;

/// Maximum PostgreSQL connections held by the pool
pub const MAX_DB_CONNECTIONS: u32 = 10;

/// Load and initialize the credential store
///
/// # Errors
///
/// `StoreError::Database` if the database cannot be reached, and
/// `StoreError::Migration` if the schema cannot be brought up to date.
pub async fn load_store(config: &AppConfig) -> Result<Arc<dyn CredentialStore>, StoreError> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Using in-memory credential store; accounts are lost on restart.");
        return Ok(Arc::new(InMemoryCredentialStore::new()));
    };

    tracing::info!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect(database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create database connection pool: {}", e);
            StoreError::Database(e)
        })?;

    let store = PgCredentialStore::new(pool);
    store.migrate().await.map_err(|e| {
        tracing::error!("Failed to run database migrations: {}", e);
        e
    })?;

    tracing::info!("Database connected and migrated");
    Ok(Arc::new(store))
}
