use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{CredentialStore, FailureOutcome, StoreError};
use crate::backend::auth::accounts::{Account, AccountUpdate, NewAccount};

/// In-memory credential store.
///
/// Intended for tests/dev. Each operation runs under a single lock
/// acquisition, which gives it the same atomicity as the SQL statements of
/// the PostgreSQL store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_accounts<T>(
        &self,
        f: impl FnOnce(&mut HashMap<Uuid, Account>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut accounts = self.accounts.lock().map_err(|_| StoreError::Poisoned)?;
        f(&mut accounts)
    }
}

fn matches_identity(account: &Account, identity: &str) -> bool {
    account.username == identity || account.email.eq_ignore_ascii_case(identity)
}

fn check_unique(
    accounts: &HashMap<Uuid, Account>,
    skip: Option<Uuid>,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<(), StoreError> {
    for account in accounts.values().filter(|a| Some(a.id) != skip) {
        if username.is_some_and(|u| account.username == u) {
            return Err(StoreError::Conflict("username"));
        }
        if email.is_some_and(|e| account.email.eq_ignore_ascii_case(e)) {
            return Err(StoreError::Conflict("email"));
        }
    }
    Ok(())
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Account>, StoreError> {
        self.with_accounts(|accounts| {
            Ok(accounts
                .values()
                .find(|a| matches_identity(a, identity))
                .cloned())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        self.with_accounts(|accounts| Ok(accounts.get(&id).cloned()))
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        self.with_accounts(|accounts| {
            let mut all: Vec<Account> = accounts.values().cloned().collect();
            all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            Ok(all)
        })
    }

    async fn insert(&self, account: NewAccount, now: DateTime<Utc>) -> Result<Account, StoreError> {
        self.with_accounts(|accounts| {
            check_unique(accounts, None, Some(&account.username), Some(&account.email))?;

            let record = Account {
                id: Uuid::new_v4(),
                username: account.username,
                email: account.email,
                password_hash: account.password_hash,
                role: account.role,
                is_active: account.is_active,
                failed_attempts: 0,
                locked_until: None,
                created_at: now,
                updated_at: now,
            };
            accounts.insert(record.id, record.clone());
            Ok(record)
        })
    }

    async fn update(
        &self,
        id: Uuid,
        update: AccountUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError> {
        self.with_accounts(|accounts| {
            if !accounts.contains_key(&id) {
                return Ok(None);
            }
            check_unique(
                accounts,
                Some(id),
                update.username.as_deref(),
                update.email.as_deref(),
            )?;

            let Some(account) = accounts.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(username) = update.username {
                account.username = username;
            }
            if let Some(email) = update.email {
                account.email = email;
            }
            if let Some(role) = update.role {
                account.role = role;
            }
            if let Some(is_active) = update.is_active {
                account.is_active = is_active;
            }
            account.updated_at = now;
            Ok(Some(account.clone()))
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.with_accounts(|accounts| Ok(accounts.remove(&id).is_some()))
    }

    async fn record_failure(
        &self,
        id: Uuid,
        threshold: u32,
        lock_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<FailureOutcome>, StoreError> {
        self.with_accounts(|accounts| {
            let Some(account) = accounts.get_mut(&id) else {
                return Ok(None);
            };

            account.failed_attempts = account.failed_attempts.saturating_add(1);
            let newly_locked =
                account.locked_until.is_none() && account.failed_attempts >= threshold;
            if newly_locked {
                account.locked_until = Some(lock_until);
            }
            account.updated_at = now;

            Ok(Some(FailureOutcome {
                attempts: account.failed_attempts,
                locked_until: account.locked_until,
                newly_locked,
            }))
        })
    }

    async fn reset_failures(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), StoreError> {
        self.with_accounts(|accounts| {
            if let Some(account) = accounts.get_mut(&id) {
                if account.failed_attempts != 0 && account.locked_until.is_none() {
                    account.failed_attempts = 0;
                    account.updated_at = now;
                }
            }
            Ok(())
        })
    }

    async fn clear_expired_lock(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, StoreError> {
        self.with_accounts(|accounts| match accounts.get_mut(&id) {
            Some(account) if account.locked_until.is_some_and(|until| until <= now) => {
                account.locked_until = None;
                account.failed_attempts = 0;
                account.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        })
    }

    async fn clear_lock(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, StoreError> {
        self.with_accounts(|accounts| match accounts.get_mut(&id) {
            Some(account) => {
                account.locked_until = None;
                account.failed_attempts = 0;
                account.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        })
    }

    async fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.with_accounts(|accounts| match accounts.get_mut(&id) {
            Some(account) => {
                account.password_hash = password_hash;
                account.locked_until = None;
                account.failed_attempts = 0;
                account.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        })
    }
}
