//! Login Attempt Lockout
//!
//! Decides whether a login attempt may proceed and how its outcome changes
//! the account's counter and lock expiry.
//!
//! # States
//!
//! ```text
//!   Unlocked(attempts) --failure, attempts+1 < threshold--> Unlocked(attempts+1)
//!   Unlocked(attempts) --failure, attempts+1 >= threshold--> Locked(now + duration)
//!   Unlocked(attempts) --success--> Unlocked(0)
//!   Locked(until)      --attempt before until--> Locked(until)   (no hashing)
//!   Locked(until)      --attempt at/after until--> Unlocked(0), then evaluated
//! ```
//!
//! All counter changes go through the store's atomic updates; nothing here
//! computes a new counter value in memory.

use chrono::{DateTime, Duration, Utc};

use crate::backend::auth::accounts::{Account, LockState};
use crate::backend::auth::errors::AuthError;
use crate::backend::auth::password::PasswordHasher;
use crate::backend::auth::store::CredentialStore;
use crate::shared::AppConfig;

/// Lockout policy configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Consecutive failures that lock the account
    pub threshold: u32,
    /// How long the account stays locked
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    /// 5 failed attempts, 30 minute lock
    fn default() -> Self {
        Self {
            threshold: 5,
            lock_duration: Duration::minutes(30),
        }
    }
}

impl LockoutPolicy {
    pub fn new(threshold: u32, lock_duration: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            lock_duration,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.lockout_threshold, config.lockout_duration)
    }

    /// Run a login attempt for `identity`.
    ///
    /// Unknown and inactive identities fail with `InvalidCredentials` after a
    /// throwaway hash verification, so they are indistinguishable from a
    /// wrong password.
    pub async fn attempt_login(
        &self,
        store: &dyn CredentialStore,
        hasher: &PasswordHasher,
        identity: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Account, AuthError> {
        let account = match store.find_by_identity(identity).await? {
            Some(account) if account.is_active => account,
            Some(_) => {
                tracing::warn!(identity = ?identity, "Login attempt for inactive account");
                hasher.verify_dummy(password).await?;
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                tracing::warn!(identity = ?identity, "Login attempt for unknown identity");
                hasher.verify_dummy(password).await?;
                return Err(AuthError::InvalidCredentials);
            }
        };

        self.verify_account(store, hasher, account, password, now).await
    }

    /// Verify `password` for an already loaded account under lockout rules.
    pub async fn verify_account(
        &self,
        store: &dyn CredentialStore,
        hasher: &PasswordHasher,
        mut account: Account,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Account, AuthError> {
        match account.lock_state(now) {
            LockState::Locked { until } => {
                tracing::warn!("Rejected attempt for locked account {} (until {})", account.id, until);
                return Err(AuthError::AccountLocked { until });
            }
            LockState::Expired { until } => {
                store.clear_expired_lock(account.id, now).await?;
                tracing::info!("Lock on account {} expired at {}, cleared", account.id, until);
                account.locked_until = None;
                account.failed_attempts = 0;
            }
            LockState::Unlocked { .. } => {}
        }

        if hasher.verify(password, &account.password_hash).await? {
            if account.failed_attempts != 0 {
                store.reset_failures(account.id, now).await?;
                account.failed_attempts = 0;
            }
            return Ok(account);
        }

        let lock_until = now
            .checked_add_signed(self.lock_duration)
            .ok_or(AuthError::LockExpiryOutOfRange)?;
        let Some(outcome) = store
            .record_failure(account.id, self.threshold, lock_until, now)
            .await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        if outcome.newly_locked {
            tracing::warn!(
                "Account {} locked after {} failed attempts",
                account.id,
                outcome.attempts
            );
        } else {
            tracing::warn!(
                "Failed attempt {} of {} for account {}",
                outcome.attempts,
                self.threshold,
                account.id
            );
        }

        match outcome.locked_until {
            Some(until) if until > now => Err(AuthError::AccountLocked { until }),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::accounts::{NewAccount, Role};
    use crate::backend::auth::store::InMemoryCredentialStore;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    const PASSWORD: &str = "correct-password";

    async fn setup(policy: LockoutPolicy) -> (Arc<InMemoryCredentialStore>, PasswordHasher, Account, LockoutPolicy) {
        let store = Arc::new(InMemoryCredentialStore::new());
        let hasher = PasswordHasher::new(4, 4);
        let hash = hasher.hash(PASSWORD).await.unwrap();
        let account = store
            .insert(
                NewAccount {
                    username: "ada".into(),
                    email: "a@x.com".into(),
                    password_hash: hash,
                    role: Role::Editor,
                    is_active: true,
                },
                Utc::now(),
            )
            .await
            .unwrap();
        (store, hasher, account, policy)
    }

    #[tokio::test]
    async fn test_success_returns_account() {
        let (store, hasher, account, policy) = setup(LockoutPolicy::default()).await;
        let result = policy
            .attempt_login(store.as_ref(), &hasher, "ada", PASSWORD, Utc::now())
            .await
            .unwrap();
        assert_eq!(result.id, account.id);
    }

    #[tokio::test]
    async fn test_unknown_and_inactive_are_invalid_credentials() {
        let (store, hasher, account, policy) = setup(LockoutPolicy::default()).await;
        let now = Utc::now();

        let unknown = policy
            .attempt_login(store.as_ref(), &hasher, "nobody", PASSWORD, now)
            .await;
        assert_matches!(unknown, Err(AuthError::InvalidCredentials));

        let deactivate = crate::backend::auth::accounts::AccountUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        store.update(account.id, deactivate, now).await.unwrap();
        let inactive = policy
            .attempt_login(store.as_ref(), &hasher, "ada", PASSWORD, now)
            .await;
        assert_matches!(inactive, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_success_resets_counter() {
        let (store, hasher, account, policy) = setup(LockoutPolicy::default()).await;
        let now = Utc::now();

        for _ in 0..3 {
            let _ = policy.attempt_login(store.as_ref(), &hasher, "ada", "wrong-password", now).await;
        }
        assert_eq!(store.find_by_id(account.id).await.unwrap().unwrap().failed_attempts, 3);

        policy
            .attempt_login(store.as_ref(), &hasher, "ada", PASSWORD, now)
            .await
            .unwrap();
        assert_eq!(store.find_by_id(account.id).await.unwrap().unwrap().failed_attempts, 0);
    }

    #[tokio::test]
    async fn test_threshold_failures_lock_the_account() {
        let (store, hasher, account, policy) =
            setup(LockoutPolicy::new(5, Duration::minutes(30))).await;
        let t0 = Utc::now();

        for _ in 0..4 {
            let result = policy
                .attempt_login(store.as_ref(), &hasher, "a@x.com", "wrong-password", t0)
                .await;
            assert_matches!(result, Err(AuthError::InvalidCredentials));
        }

        let fifth = policy
            .attempt_login(store.as_ref(), &hasher, "a@x.com", "wrong-password", t0)
            .await;
        assert_matches!(fifth, Err(AuthError::AccountLocked { until }) if until == t0 + Duration::minutes(30));

        let stored = store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.failed_attempts, 5);
        assert_eq!(stored.locked_until, Some(t0 + Duration::minutes(30)));
    }

    #[tokio::test]
    async fn test_unrepresentable_lock_expiry_is_an_error() {
        let (store, hasher, account, policy) =
            setup(LockoutPolicy::new(5, Duration::MAX)).await;

        let result = policy
            .attempt_login(store.as_ref(), &hasher, "ada", "wrong-password", Utc::now())
            .await;
        assert_matches!(result, Err(AuthError::LockExpiryOutOfRange));
        assert_eq!(store.find_by_id(account.id).await.unwrap().unwrap().failed_attempts, 0);
    }

    #[tokio::test]
    async fn test_locked_account_refuses_correct_password_without_counting() {
        let (store, hasher, account, policy) =
            setup(LockoutPolicy::new(2, Duration::minutes(30))).await;
        let t0 = Utc::now();

        for _ in 0..2 {
            let _ = policy.attempt_login(store.as_ref(), &hasher, "ada", "wrong-password", t0).await;
        }

        let result = policy
            .attempt_login(store.as_ref(), &hasher, "ada", PASSWORD, t0 + Duration::minutes(10))
            .await;
        assert_matches!(result, Err(AuthError::AccountLocked { .. }));
        assert_eq!(store.find_by_id(account.id).await.unwrap().unwrap().failed_attempts, 2);
    }

    #[tokio::test]
    async fn test_expired_lock_resets_before_evaluation() {
        let (store, hasher, account, policy) =
            setup(LockoutPolicy::new(2, Duration::minutes(30))).await;
        let t0 = Utc::now();

        for _ in 0..2 {
            let _ = policy.attempt_login(store.as_ref(), &hasher, "ada", "wrong-password", t0).await;
        }

        // Wrong password after expiry counts as the first failure of a fresh cycle.
        let after = t0 + Duration::minutes(30);
        let result = policy
            .attempt_login(store.as_ref(), &hasher, "ada", "wrong-password", after)
            .await;
        assert_matches!(result, Err(AuthError::InvalidCredentials));

        let stored = store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.failed_attempts, 1);
        assert_eq!(stored.locked_until, None);
    }

    #[tokio::test]
    async fn test_concurrent_failures_lock_exactly_once() {
        let (store, hasher, account, policy) =
            setup(LockoutPolicy::new(3, Duration::minutes(30))).await;
        let now = Utc::now();

        let attempts = (0..8).map(|_| {
            let store = Arc::clone(&store);
            let hasher = hasher.clone();
            tokio::spawn(async move {
                policy
                    .attempt_login(store.as_ref(), &hasher, "ada", "wrong-password", now)
                    .await
            })
        });
        let results = futures_util::future::join_all(attempts).await;

        for result in results {
            assert_matches!(
                result.unwrap(),
                Err(AuthError::InvalidCredentials) | Err(AuthError::AccountLocked { .. })
            );
        }

        let stored = store.find_by_id(account.id).await.unwrap().unwrap();
        assert!(stored.failed_attempts >= 3);
        assert_eq!(stored.locked_until, Some(now + Duration::minutes(30)));
    }
}
