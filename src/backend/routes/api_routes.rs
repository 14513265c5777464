/**
 * API Routes
 *
 * # Public
 * - `POST /login` - Credential check and token issuance
 * - `GET /health` - Liveness probe
 *
 * # Session (bearer token)
 * - `GET /me` - Current account
 * - `PUT /change-password` - Change own password
 *
 * # Admin (bearer token, role `admin`)
 * - `GET|POST /users`
 * - `GET|PUT|DELETE /users/{id}`
 * - `POST /users/{id}/reset-password`
 */

use axum::{
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};

use crate::backend::auth::handlers::{
    change_password, create_user, delete_user, get_me, get_user, list_users, login,
    reset_password, update_user,
};
use crate::backend::middleware::{admin_middleware, session_middleware};
use crate::backend::server::state::AppState;

/// Routes reachable without a session
pub fn configure_public_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/login", post(login))
        .route("/health", get(health))
}

/// Routes for any authenticated account
pub fn configure_session_routes(router: Router<AppState>, state: AppState) -> Router<AppState> {
    let session_routes = Router::new()
        .route("/me", get(get_me))
        .route("/change-password", put(change_password))
        .merge(admin_routes())
        .layer(middleware::from_fn_with_state(state, session_middleware));

    router.merge(session_routes)
}

/// Admin user management; `admin_middleware` runs after the session layer
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/reset-password", post(reset_password))
        .layer(middleware::from_fn(admin_middleware))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
