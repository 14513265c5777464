/**
 * Application State Management
 *
 * `AppState` is the router state shared by every handler. It holds the
 * authentication service (store, hasher, token keys, lockout policy) and
 * the configuration it was built from.
 *
 * Handlers extract only what they need through `FromRef`, e.g.
 * `State<AuthService>`.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::auth::service::AuthService;
use crate::backend::auth::store::CredentialStore;
use crate::shared::AppConfig;

#[derive(Clone)]
pub struct AppState {
    /// Authentication core; cheap to clone (all fields are shared handles)
    pub auth: AuthService,

    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>, config: AppConfig) -> Self {
        Self {
            auth: AuthService::from_config(store, &config),
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth.clone()
    }
}
