//! Credential Store
//!
//! The store is the single source of truth for account state. It carries no
//! business logic: every method is one atomic read or one atomic update, so
//! concurrent requests against the same account never lose writes.
//!
//! # Implementations
//!
//! - **`postgres`** - `PgCredentialStore`, the production store (sqlx)
//! - **`memory`** - `InMemoryCredentialStore`, for development and tests
//!
//! # Atomicity Contract
//!
//! - `record_failure` increments the counter and, in the same update, sets
//!   `locked_until` when the post-increment count reaches the threshold and
//!   no lock is recorded yet.
//! - `clear_expired_lock` only clears a lock that is still expired at the time
//!   of the update.
//! - `set_password_hash` and `clear_lock` reset the counter and the lock in
//!   the same update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::auth::accounts::{Account, AccountUpdate, NewAccount};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Store failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique field (username or email) is already taken
    #[error("{0} already exists")]
    Conflict(&'static str),

    /// A persisted record cannot be interpreted (e.g. unknown role)
    #[error("corrupt account record: {0}")]
    Corrupt(String),

    /// In-memory store lock was poisoned by a panicking writer
    #[error("store lock poisoned")]
    Poisoned,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Counter state after an atomic failure increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureOutcome {
    /// Post-increment failed attempt count
    pub attempts: u32,
    /// Lock expiry after the update
    pub locked_until: Option<DateTime<Utc>>,
    /// This update is the one that set the lock
    pub newly_locked: bool,
}

/// Durable account storage with field-level atomic updates
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find an account by username or (case-insensitive) email
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// All accounts ordered by creation time
    async fn list(&self) -> Result<Vec<Account>, StoreError>;

    async fn insert(&self, account: NewAccount, now: DateTime<Utc>) -> Result<Account, StoreError>;

    /// Apply an administrative update; `None` when the account does not exist
    async fn update(
        &self,
        id: Uuid,
        update: AccountUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError>;

    /// Remove an account; `false` when it did not exist
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Atomically count a failed attempt; `None` when the account does not exist
    async fn record_failure(
        &self,
        id: Uuid,
        threshold: u32,
        lock_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<FailureOutcome>, StoreError>;

    /// Reset the counter after a successful login on an unlocked account
    async fn reset_failures(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), StoreError>;

    /// Clear lock and counter if the recorded lock has expired at `now`
    async fn clear_expired_lock(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Unconditionally clear lock and counter
    async fn clear_lock(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Replace the password hash and reset lock and counter
    async fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}
