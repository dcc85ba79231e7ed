//! API handlers for the WES Portal backend

pub mod application;
pub mod auth;
pub mod user;

// Re-export extractors from middleware for handler use
pub use crate::middleware::auth::{AdminUser, AuthUser};
