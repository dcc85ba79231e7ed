//! WES Portal Backend Library
//!
//! This library exports the core modules for the WES Portal backend server:
//! credential-based authentication, session tokens, and the credential
//! evaluation application workflow.

pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod users;
