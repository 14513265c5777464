/**
 * Router Configuration
 *
 * Combines the public, session and admin routes into one router, adds
 * request tracing and a JSON 404 fallback.
 *
 * # Layer Order
 *
 * For `/users` routes a request passes `TraceLayer`, then
 * `session_middleware` (401 without a valid token), then
 * `admin_middleware` (403 for non-admins), then the handler.
 */

use axum::{http::StatusCode, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::{configure_public_routes, configure_session_routes};
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_public_routes(Router::new());
    let router = configure_session_routes(router, app_state.clone());

    router
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

async fn not_found() -> BackendError {
    BackendError::handler(StatusCode::NOT_FOUND, "Not found")
}
