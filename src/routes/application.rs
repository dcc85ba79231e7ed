//! Application routes

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::application;
use crate::state::AppState;

/// Create application routes
pub fn application_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/applications",
            post(application::create_application).get(application::list_applications),
        )
        .route(
            "/api/applications/:id",
            get(application::get_application).put(application::update_application),
        )
        .route(
            "/api/applications/:id/submit",
            post(application::submit_application),
        )
        .route(
            "/api/applications/:id/cancel",
            post(application::cancel_application),
        )
        .route(
            "/api/applications/:id/status",
            put(application::update_application_status),
        )
}
