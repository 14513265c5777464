//! Authentication Handlers Module
//!
//! HTTP handlers for authentication and user management. Each handler is a
//! thin adapter: decode the body, call `AuthService`, shape the response.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── types.rs    - Request/response types, ValidatedJson
//! ├── login.rs    - POST /login
//! ├── me.rs       - GET /me
//! ├── password.rs - PUT /change-password
//! └── users.rs    - Admin user management
//! ```
//!
//! # Handlers
//!
//! - **`login`** - POST /login - Credential check and token issuance
//! - **`get_me`** - GET /me - Current account
//! - **`change_password`** - PUT /change-password - Own password change
//! - **`list_users`**, **`create_user`**, **`get_user`**, **`update_user`**,
//!   **`delete_user`**, **`reset_password`** - Admin-only `/users` endpoints

/// Request and response types
pub mod types;

/// Login handler
pub mod login;

/// Get current user handler
pub mod me;

/// Change password handler
pub mod password;

/// Admin user management handlers
pub mod users;

pub use types::{
    AccountId, ChangePasswordRequest, CreateUserRequest, LoginRequest, LoginResponse, MeResponse,
    MessageResponse, ResetPasswordRequest, UpdateUserRequest, Validate, ValidatedJson,
};

pub use login::login;
pub use me::get_me;
pub use password::change_password;
pub use users::{create_user, delete_user, get_user, list_users, reset_password, update_user};
