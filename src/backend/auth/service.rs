/**
 * Authentication Service
 *
 * Composes the credential store, password hasher, lockout policy and token
 * service into the operations the HTTP handlers and the maintenance binary
 * call. Every operation takes `now` explicitly; nothing here reads the clock.
 */

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::backend::auth::accounts::{
    validate_email, validate_username, Account, AccountUpdate, NewAccount, Role,
};
use crate::backend::auth::errors::AuthError;
use crate::backend::auth::gate::Session;
use crate::backend::auth::lockout::LockoutPolicy;
use crate::backend::auth::password::{validate_password, PasswordHasher};
use crate::backend::auth::sessions::{IssuedToken, TokenService};
use crate::backend::auth::store::CredentialStore;
use crate::shared::{AppConfig, BootstrapAdmin, SharedError};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: Account,
    pub token: IssuedToken,
}

/// Input for administrative account creation
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: TokenService,
    policy: LockoutPolicy,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: TokenService,
        policy: LockoutPolicy,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            policy,
        }
    }

    pub fn from_config(store: Arc<dyn CredentialStore>, config: &AppConfig) -> Self {
        Self::new(
            store,
            PasswordHasher::new(config.bcrypt_cost, config.hash_workers),
            TokenService::from_config(config),
            LockoutPolicy::from_config(config),
        )
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn policy(&self) -> LockoutPolicy {
        self.policy
    }

    /// Verify credentials under the lockout rules and issue a session token
    pub async fn login(
        &self,
        identity: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, AuthError> {
        let account = self
            .policy
            .attempt_login(self.store.as_ref(), &self.hasher, identity, password, now)
            .await?;

        let token = self.tokens.issue(&account, now)?;
        tracing::info!("Login succeeded for {} ({})", account.username, account.id);

        Ok(LoginOutcome { account, token })
    }

    /// Load the account behind a session
    ///
    /// A session whose account was deleted or deactivated since issuance is
    /// `Unauthorized`.
    pub async fn current_account(&self, session: &Session) -> Result<Account, AuthError> {
        match self.store.find_by_id(session.account_id).await? {
            Some(account) if account.is_active => Ok(account),
            _ => {
                tracing::warn!("Session for missing or inactive account {}", session.account_id);
                Err(AuthError::Unauthorized)
            }
        }
    }

    /// Change the caller's own password after verifying the current one
    ///
    /// The current password goes through the same lockout-guarded check as a
    /// login: a wrong value counts as a failed attempt and leaves the hash
    /// unchanged.
    pub async fn change_password(
        &self,
        account_id: Uuid,
        current_password: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let account = match self.store.find_by_id(account_id).await? {
            Some(account) if account.is_active => account,
            _ => return Err(AuthError::Unauthorized),
        };

        let account = self
            .policy
            .verify_account(
                self.store.as_ref(),
                &self.hasher,
                account,
                current_password,
                now,
            )
            .await?;

        validate_password("new_password", new_password)?;
        if new_password == current_password {
            return Err(SharedError::validation(
                "new_password",
                "New password must differ from the current password",
            )
            .into());
        }

        let hash = self.hasher.hash(new_password).await?;
        if !self.store.set_password_hash(account.id, hash, now).await? {
            return Err(AuthError::Unauthorized);
        }

        tracing::info!("Password changed for account {}", account.id);
        Ok(())
    }

    /// Set a new password for any account; the caller has passed the admin gate
    pub async fn admin_reset_password(
        &self,
        actor: &Session,
        account_id: Uuid,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        validate_password("new_password", new_password)?;

        let hash = self.hasher.hash(new_password).await?;
        if !self.store.set_password_hash(account_id, hash, now).await? {
            return Err(AuthError::NotFound);
        }

        tracing::info!(
            "Admin {} reset password for account {}",
            actor.account_id,
            account_id
        );
        Ok(())
    }

    /// Clear the lock and failure counter of the account matching `identity`
    pub async fn unlock_account(&self, identity: &str, now: DateTime<Utc>) -> Result<Account, AuthError> {
        let account = self
            .store
            .find_by_identity(identity)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !self.store.clear_lock(account.id, now).await? {
            return Err(AuthError::NotFound);
        }

        tracing::info!(
            "Unlocked account {} ({}), previous failures: {}",
            account.username,
            account.id,
            account.failed_attempts
        );

        self.store
            .find_by_id(account.id)
            .await?
            .ok_or(AuthError::NotFound)
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, AuthError> {
        Ok(self.store.list().await?)
    }

    pub async fn get_account(&self, id: Uuid) -> Result<Account, AuthError> {
        self.store.find_by_id(id).await?.ok_or(AuthError::NotFound)
    }

    pub async fn create_account(
        &self,
        input: CreateAccount,
        now: DateTime<Utc>,
    ) -> Result<Account, AuthError> {
        validate_username(&input.username)?;
        validate_email(&input.email)?;
        validate_password("password", &input.password)?;

        let password_hash = self.hasher.hash(&input.password).await?;
        let account = self
            .store
            .insert(
                NewAccount {
                    username: input.username,
                    email: input.email,
                    password_hash,
                    role: input.role,
                    is_active: input.is_active,
                },
                now,
            )
            .await?;

        tracing::info!(
            "Created {} account {} ({})",
            account.role,
            account.username,
            account.id
        );
        Ok(account)
    }

    /// Apply an administrative edit
    ///
    /// An admin cannot deactivate or demote their own account.
    pub async fn update_account(
        &self,
        actor: &Session,
        id: Uuid,
        update: AccountUpdate,
        now: DateTime<Utc>,
    ) -> Result<Account, AuthError> {
        if let Some(username) = &update.username {
            validate_username(username)?;
        }
        if let Some(email) = &update.email {
            validate_email(email)?;
        }

        if actor.account_id == id {
            if update.is_active == Some(false) {
                return Err(SharedError::validation("is_active", "Cannot deactivate your own account").into());
            }
            if matches!(update.role, Some(role) if role != actor.role) {
                return Err(SharedError::validation("role", "Cannot change your own role").into());
            }
        }

        let account = self
            .store
            .update(id, update, now)
            .await?
            .ok_or(AuthError::NotFound)?;

        tracing::info!("Admin {} updated account {}", actor.account_id, account.id);
        Ok(account)
    }

    pub async fn delete_account(&self, actor: &Session, id: Uuid) -> Result<(), AuthError> {
        if actor.account_id == id {
            return Err(SharedError::validation("id", "Cannot delete your own account").into());
        }

        if !self.store.delete(id).await? {
            return Err(AuthError::NotFound);
        }

        tracing::info!("Admin {} deleted account {}", actor.account_id, id);
        Ok(())
    }

    /// Create the configured bootstrap admin unless its username or email
    /// already exists
    ///
    /// # Returns
    ///
    /// The created account, or `None` when nothing had to be done.
    pub async fn ensure_bootstrap_admin(
        &self,
        admin: &BootstrapAdmin,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, AuthError> {
        let by_username = self.store.find_by_identity(&admin.username).await?;
        let by_email = self.store.find_by_identity(&admin.email).await?;
        if by_username.is_some() || by_email.is_some() {
            tracing::debug!("Bootstrap admin {} already present", admin.username);
            return Ok(None);
        }

        let account = self
            .create_account(
                CreateAccount {
                    username: admin.username.clone(),
                    email: admin.email.clone(),
                    password: admin.password.clone(),
                    role: Role::Admin,
                    is_active: true,
                },
                now,
            )
            .await?;

        tracing::info!("Bootstrap admin {} created", account.username);
        Ok(Some(account))
    }
}
