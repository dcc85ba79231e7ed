//! User route definitions

use axum::{routing::put, Router};

use crate::handlers::user::update_profile;
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/api/users/profile", put(update_profile))
}
