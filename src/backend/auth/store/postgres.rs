/**
 * PostgreSQL Credential Store
 *
 * Every operation is a single SQL statement, so the database provides the
 * atomicity the lockout state machine relies on. Failure counting in
 * particular is `failed_attempts = failed_attempts + 1` evaluated by the
 * database, never a value computed in request memory.
 *
 * Schema lives in `migrations/`.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{CredentialStore, FailureOutcome, StoreError};
use crate::backend::auth::accounts::{Account, AccountUpdate, NewAccount, Role};

/// Row shape as stored; converted into `Account` with role validation
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
    failed_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("account {}: {}", row.id, e)))?;
        let failed_attempts = u32::try_from(row.failed_attempts).map_err(|_| {
            StoreError::Corrupt(format!(
                "account {}: negative failed_attempts {}",
                row.id, row.failed_attempts
            ))
        })?;

        Ok(Account {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            is_active: row.is_active,
            failed_attempts,
            locked_until: row.locked_until,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FailureRow {
    failed_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    newly_locked: bool,
}

/// Credential store backed by the `accounts` table
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the bundled migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("accounts_email_key") => StoreError::Conflict("email"),
                _ => StoreError::Conflict("username"),
            };
        }
    }
    StoreError::Database(err)
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, username, email, password_hash, role, is_active, failed_attempts, locked_until, created_at, updated_at
            FROM accounts
            WHERE username = $1 OR lower(email) = lower($1)
            "#
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, username, email, password_hash, role, is_active, failed_attempts, locked_until, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, username, email, password_hash, role, is_active, failed_attempts, locked_until, created_at, updated_at
            FROM accounts
            ORDER BY created_at, id
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Account::try_from).collect()
    }

    async fn insert(&self, account: NewAccount, now: DateTime<Utc>) -> Result<Account, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, username, email, password_hash, role, is_active, failed_attempts, locked_until, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 0, NULL, $7, $7)
            RETURNING id, username, email, password_hash, role, is_active, failed_attempts, locked_until, created_at, updated_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.is_active)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Account::try_from(row)
    }

    async fn update(
        &self,
        id: Uuid,
        update: AccountUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE accounts
            SET username = COALESCE($2, username),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                is_active = COALESCE($5, is_active),
                updated_at = $6
            WHERE id = $1
            RETURNING id, username, email, password_hash, role, is_active, failed_attempts, locked_until, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(update.username)
        .bind(update.email)
        .bind(update.role.map(|r| r.as_str()))
        .bind(update.is_active)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        row.map(Account::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_failure(
        &self,
        id: Uuid,
        threshold: u32,
        lock_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<FailureOutcome>, StoreError> {
        // The FOR UPDATE subquery pins the pre-update lock value so the
        // statement can report whether it was the one that set the lock.
        let row = sqlx::query_as::<_, FailureRow>(
            r#"
            UPDATE accounts AS a
            SET failed_attempts = a.failed_attempts + 1,
                locked_until = CASE
                    WHEN a.locked_until IS NULL AND a.failed_attempts + 1 >= $2 THEN $3
                    ELSE a.locked_until
                END,
                updated_at = $4
            FROM (SELECT id, locked_until FROM accounts WHERE id = $1 FOR UPDATE) AS prev
            WHERE a.id = prev.id
            RETURNING a.failed_attempts,
                      a.locked_until,
                      (prev.locked_until IS NULL AND a.locked_until IS NOT NULL) AS newly_locked
            "#
        )
        .bind(id)
        .bind(to_i32(threshold))
        .bind(lock_until)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let attempts = u32::try_from(row.failed_attempts).map_err(|_| {
                StoreError::Corrupt(format!("account {}: negative failed_attempts", id))
            })?;
            Ok(FailureOutcome {
                attempts,
                locked_until: row.locked_until,
                newly_locked: row.newly_locked,
            })
        })
        .transpose()
    }

    async fn reset_failures(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET failed_attempts = 0, updated_at = $2
            WHERE id = $1 AND failed_attempts <> 0 AND locked_until IS NULL
            "#
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_expired_lock(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET failed_attempts = 0, locked_until = NULL, updated_at = $2
            WHERE id = $1 AND locked_until IS NOT NULL AND locked_until <= $2
            "#
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_lock(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET failed_attempts = 0, locked_until = NULL, updated_at = $2
            WHERE id = $1
            "#
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_password_hash(
        &self,
        id: Uuid,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2, failed_attempts = 0, locked_until = NULL, updated_at = $3
            WHERE id = $1
            "#
        )
        .bind(id)
        .bind(password_hash)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
