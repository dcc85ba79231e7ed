//! Middleware for the WES Portal API
//!
//! Request gate (bearer-token verification), security headers and request
//! logging.

pub mod auth;
mod security;
mod tracing;

pub use auth::{AdminUser, AuthUser};
pub use security::{hsts_header, security_headers};
pub use tracing::request_tracing;
