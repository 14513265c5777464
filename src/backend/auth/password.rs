/**
 * Password Hashing
 *
 * bcrypt hashing and verification. Both are CPU-bound, so they run on tokio's
 * blocking pool, and a semaphore caps how many run at once. A burst of login
 * attempts therefore queues behind the permits instead of occupying every
 * blocking thread.
 *
 * Comparison of the computed and stored digests happens inside
 * `bcrypt::verify`, which is constant-time.
 */

use std::sync::Arc;

use tokio::sync::{OnceCell, Semaphore};

use crate::backend::auth::errors::AuthError;
use crate::shared::SharedError;

/// bcrypt only considers the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Minimum password length in characters
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Salted one-way hasher with bounded concurrency
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    permits: Arc<Semaphore>,
    dummy_hash: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    pub fn new(cost: u32, workers: usize) -> Self {
        Self {
            cost,
            permits: Arc::new(Semaphore::new(workers.max(1))),
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        let cost = self.cost;
        self.run(move || bcrypt::hash(password, cost)).await
    }

    /// `Ok(false)` for a wrong password; `Err` only when the stored hash is unusable
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        self.run(move || bcrypt::verify(password, &hash)).await
    }

    /// Spend the same work as a real verification against a throwaway hash.
    ///
    /// Used when the identity does not exist so that path costs about as
    /// much as a wrong password.
    pub async fn verify_dummy(&self, password: &str) -> Result<(), AuthError> {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.hash("siteauth-dummy-password"))
            .await?
            .clone();
        self.verify(password, &dummy).await?;
        Ok(())
    }

    async fn run<T, F>(&self, job: F) -> Result<T, AuthError>
    where
        F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
    }
}

/// Check a candidate password against the length rules
pub fn validate_password(field: &str, password: &str) -> Result<(), SharedError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(SharedError::validation(
            field,
            format!("Password must be at least {} characters", MIN_PASSWORD_CHARS),
        ));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(SharedError::validation(
            field,
            format!("Password must be at most {} bytes", MAX_PASSWORD_BYTES),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4, 2)
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("correct horse").await.unwrap();
        assert_ne!(hash, "correct horse");
        assert!(hasher.verify("correct horse", &hash).await.unwrap());
        assert!(!hasher.verify("battery staple", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let hasher = hasher();
        let a = hasher.hash("same password").await.unwrap();
        let b = hasher.hash("same password").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_an_error() {
        let result = hasher().verify("anything", "not-a-bcrypt-hash").await;
        assert!(matches!(result, Err(AuthError::Hashing(_))));
    }

    #[tokio::test]
    async fn test_dummy_verify_succeeds() {
        let hasher = hasher();
        hasher.verify_dummy("whatever").await.unwrap();
        hasher.verify_dummy("again").await.unwrap();
    }

    #[tokio::test]
    async fn test_single_worker_serializes_jobs() {
        let hasher = PasswordHasher::new(4, 1);
        let (a, b) = tokio::join!(hasher.hash("password-one"), hasher.hash("password-two"));
        assert!(a.is_ok());
        assert!(b.is_ok());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("password", "longenough").is_ok());
        assert!(validate_password("password", "short").is_err());
        assert!(validate_password("password", &"x".repeat(73)).is_err());
        assert!(validate_password("password", &"x".repeat(72)).is_ok());
    }
}
