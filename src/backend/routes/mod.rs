//! Route Configuration Module
//!
//! - **`router`** - Main router creation and layers
//! - **`api_routes`** - Endpoint groups (public, session, admin)
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! └── api_routes.rs   - Endpoint groups
//! ```

/// Main router creation
pub mod router;

/// API endpoint groups
pub mod api_routes;

pub use router::create_router;
