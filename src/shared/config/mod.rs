//! Application configuration module
//!
//! `AppConfig` is built once at startup, either from the process environment
//! (`AppConfig::from_env`) or with the builder, and then handed by reference
//! to the components that need it. Nothing else in the crate reads the
//! environment.
//!
//! # Environment
//!
//! | Variable | Default |
//! |---|---|
//! | `JWT_SECRET` | required, at least 32 bytes |
//! | `TOKEN_TTL_SECS` | 28800 (8 hours), at most one year |
//! | `LOCKOUT_THRESHOLD` | 5 |
//! | `LOCKOUT_DURATION_SECS` | 1800 (30 minutes), at most one year |
//! | `BCRYPT_COST` | 12 |
//! | `HASH_WORKERS` | 4 |
//! | `DATABASE_URL` | unset (in-memory store) |
//! | `SERVER_PORT` | 3000 |
//! | `BOOTSTRAP_ADMIN_USERNAME` / `_EMAIL` / `_PASSWORD` | unset |

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

/// Minimum length of the token signing secret in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Default session token lifetime in seconds
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 8 * 60 * 60;

/// Default number of consecutive failures that locks an account
pub const DEFAULT_LOCKOUT_THRESHOLD: u32 = 5;

/// Default lock duration in seconds
pub const DEFAULT_LOCKOUT_DURATION_SECS: i64 = 30 * 60;

/// Upper bound for `TOKEN_TTL_SECS` and `LOCKOUT_DURATION_SECS` (one year)
pub const MAX_DURATION_SECS: i64 = 365 * 24 * 60 * 60;

/// Default number of concurrent password hash computations
pub const DEFAULT_HASH_WORKERS: usize = 4;

/// Default HTTP port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Credentials for the first-run administrator account
#[derive(Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// HMAC secret used to sign session tokens
    pub jwt_secret: String,
    /// Session token lifetime
    pub token_ttl: Duration,
    /// Consecutive failed attempts before an account is locked
    pub lockout_threshold: u32,
    /// How long a locked account refuses logins
    pub lockout_duration: Duration,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Upper bound on concurrent hash computations
    pub hash_workers: usize,
    /// PostgreSQL connection string
    pub database_url: Option<String>,
    /// HTTP listen port
    pub server_port: u16,
    /// Administrator to provision on first run
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("lockout_threshold", &self.lockout_threshold)
            .field("lockout_duration", &self.lockout_duration)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("hash_workers", &self.hash_workers)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("server_port", &self.server_port)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish()
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut builder = Self::builder();

        if let Some(secret) = get("JWT_SECRET") {
            builder = builder.jwt_secret(secret);
        }
        if let Some(secs) = get("TOKEN_TTL_SECS") {
            builder = builder.token_ttl(seconds("TOKEN_TTL_SECS", &secs)?);
        }
        if let Some(threshold) = get("LOCKOUT_THRESHOLD") {
            builder = builder.lockout_threshold(parse("LOCKOUT_THRESHOLD", &threshold)?);
        }
        if let Some(secs) = get("LOCKOUT_DURATION_SECS") {
            builder = builder.lockout_duration(seconds("LOCKOUT_DURATION_SECS", &secs)?);
        }
        if let Some(cost) = get("BCRYPT_COST") {
            builder = builder.bcrypt_cost(parse("BCRYPT_COST", &cost)?);
        }
        if let Some(workers) = get("HASH_WORKERS") {
            builder = builder.hash_workers(parse("HASH_WORKERS", &workers)?);
        }
        if let Some(url) = get("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(port) = get("SERVER_PORT") {
            builder = builder.server_port(parse("SERVER_PORT", &port)?);
        }

        match (
            get("BOOTSTRAP_ADMIN_USERNAME"),
            get("BOOTSTRAP_ADMIN_EMAIL"),
            get("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(email), Some(password)) => {
                builder = builder.bootstrap_admin(BootstrapAdmin {
                    username,
                    email,
                    password,
                });
            }
            (None, None, None) => {}
            _ => return Err(ConfigError::IncompleteBootstrap),
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort {
                actual: self.jwt_secret.len(),
                minimum: MIN_SECRET_LEN,
            });
        }
        check_duration("TOKEN_TTL_SECS", self.token_ttl)?;
        if self.lockout_threshold == 0 {
            return Err(ConfigError::OutOfRange {
                key: "LOCKOUT_THRESHOLD",
                message: "must be at least 1".to_string(),
            });
        }
        check_duration("LOCKOUT_DURATION_SECS", self.lockout_duration)?;
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::OutOfRange {
                key: "BCRYPT_COST",
                message: "must be between 4 and 31".to_string(),
            });
        }
        if self.hash_workers == 0 {
            return Err(ConfigError::OutOfRange {
                key: "HASH_WORKERS",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn check_duration(key: &'static str, value: Duration) -> Result<(), ConfigError> {
    if value <= Duration::zero() {
        return Err(ConfigError::OutOfRange {
            key,
            message: "must be positive".to_string(),
        });
    }
    if value > Duration::seconds(MAX_DURATION_SECS) {
        return Err(ConfigError::OutOfRange {
            key,
            message: format!("must be at most {} seconds", MAX_DURATION_SECS),
        });
    }
    Ok(())
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn seconds(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let secs: i64 = parse(key, value)?;
    Duration::try_seconds(secs).ok_or(ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Builder for AppConfig
pub struct AppConfigBuilder {
    jwt_secret: Option<String>,
    token_ttl: Duration,
    lockout_threshold: u32,
    lockout_duration: Duration,
    bcrypt_cost: u32,
    hash_workers: usize,
    database_url: Option<String>,
    server_port: u16,
    bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for AppConfigBuilder {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            lockout_threshold: DEFAULT_LOCKOUT_THRESHOLD,
            lockout_duration: Duration::seconds(DEFAULT_LOCKOUT_DURATION_SECS),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            hash_workers: DEFAULT_HASH_WORKERS,
            database_url: None,
            server_port: DEFAULT_SERVER_PORT,
            bootstrap_admin: None,
        }
    }
}

impl AppConfigBuilder {
    /// Set the token signing secret
    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    /// Set the session token lifetime
    pub fn token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Set the number of failures that locks an account
    pub fn lockout_threshold(mut self, threshold: u32) -> Self {
        self.lockout_threshold = threshold;
        self
    }

    /// Set how long a locked account stays locked
    pub fn lockout_duration(mut self, duration: Duration) -> Self {
        self.lockout_duration = duration;
        self
    }

    /// Set the bcrypt work factor
    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Set the number of concurrent hash computations
    pub fn hash_workers(mut self, workers: usize) -> Self {
        self.hash_workers = workers;
        self
    }

    /// Set the database URL
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Set the HTTP port
    pub fn server_port(mut self, port: u16) -> Self {
        self.server_port = port;
        self
    }

    /// Set the administrator provisioned on first run
    pub fn bootstrap_admin(mut self, admin: BootstrapAdmin) -> Self {
        self.bootstrap_admin = Some(admin);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            jwt_secret: self.jwt_secret.ok_or(ConfigError::MissingValue("JWT_SECRET"))?,
            token_ttl: self.token_ttl,
            lockout_threshold: self.lockout_threshold,
            lockout_duration: self.lockout_duration,
            bcrypt_cost: self.bcrypt_cost,
            hash_workers: self.hash_workers,
            database_url: self.database_url,
            server_port: self.server_port,
            bootstrap_admin: self.bootstrap_admin,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{key} {message}")]
    OutOfRange { key: &'static str, message: String },
    #[error("JWT_SECRET is {actual} bytes, at least {minimum} required")]
    SecretTooShort { actual: usize, minimum: usize },
    #[error("BOOTSTRAP_ADMIN_USERNAME, BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together")]
    IncompleteBootstrap,
}
