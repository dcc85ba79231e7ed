//! Authentication module for the WES Portal
//!
//! Provides credential-based authentication:
//! - bcrypt password hashing and verification
//! - signed, time-limited session tokens
//! - registration, login and session introspection

pub mod jwt;
pub mod password;
pub mod service;

pub use jwt::{Claims, JwtConfig, JwtError};
pub use password::{hash_password, verify_password};
pub use service::{AuthError, AuthService};
