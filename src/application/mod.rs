//! Credential evaluation applications
//!
//! CRUD and status workflow for evaluation applications. Applicants own
//! their applications; admins review them.

pub mod model;
pub mod service;

pub use model::*;
pub use service::{ApplicationError, ApplicationService};
