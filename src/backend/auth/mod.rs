//! Authentication Module
//!
//! Credential verification, brute-force lockout, session tokens and role
//! gating for the site's administrative backend.
//!
//! # Architecture
//!
//! The auth module is organized into focused submodules, leaves first:
//!
//! - **`accounts`** - Account model, roles, lock state, input rules
//! - **`store`** - Credential store trait with PostgreSQL and in-memory backends
//! - **`password`** - bcrypt hashing on a bounded blocking pool
//! - **`lockout`** - Login attempt state machine
//! - **`sessions`** - JWT issuance and verification
//! - **`gate`** - `require_session` / `require_role`
//! - **`service`** - Operations composed from the above
//! - **`handlers`** - HTTP handlers for authentication and user management
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── accounts.rs     - Account model and validation
//! ├── errors.rs       - AuthError
//! ├── store/          - CredentialStore + backends
//! ├── password.rs     - PasswordHasher
//! ├── lockout.rs      - LockoutPolicy
//! ├── sessions.rs     - TokenService
//! ├── gate.rs         - Session checks
//! ├── service.rs      - AuthService
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Login**: identity + password → lockout check → bcrypt verify → JWT returned
//! 2. **Session**: bearer token → signature and expiry check → `Session` in request extensions
//! 3. **Admin**: session → role check → user management operation
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - Repeated failures lock the account for a fixed window
//! - Unknown identities and wrong passwords produce the same 401
//! - Password hashes never appear in responses

pub mod accounts;

pub mod errors;

/// Durable account storage
pub mod store;

/// Password hashing and policy
pub mod password;

/// Login lockout state machine
pub mod lockout;

/// JWT token generation and validation
pub mod sessions;

/// Session and role checks
pub mod gate;

pub mod service;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use accounts::{Account, AccountUpdate, AccountView, LockState, NewAccount, Role};
pub use errors::AuthError;
pub use gate::{require_role, require_session, Session};
pub use lockout::LockoutPolicy;
pub use password::PasswordHasher;
pub use service::{AuthService, CreateAccount, LoginOutcome};
pub use sessions::{IssuedToken, SessionClaims, TokenService};
pub use store::{CredentialStore, InMemoryCredentialStore, PgCredentialStore, StoreError};
