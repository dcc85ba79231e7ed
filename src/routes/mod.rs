//! Route definitions for the WES Portal API

mod application;
mod auth;
mod user;

pub use application::application_routes;
pub use auth::auth_routes;
pub use user::user_routes;
