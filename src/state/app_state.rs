//! Application state shared across handlers

use std::sync::Arc;

use axum::extract::FromRef;

use crate::application::ApplicationService;
use crate::auth::{AuthService, JwtConfig};
use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub application_service: Arc<ApplicationService>,
    pub jwt: JwtConfig,
    pub db: Database,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        application_service: Arc<ApplicationService>,
        jwt: JwtConfig,
        db: Database,
    ) -> Self {
        Self {
            auth_service,
            application_service,
            jwt,
            db,
        }
    }
}

// The request gate only needs the signing configuration
impl FromRef<AppState> for JwtConfig {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.jwt.clone()
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<ApplicationService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.application_service.clone()
    }
}
