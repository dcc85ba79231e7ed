//! User credential store

pub mod store;

pub use store::{NewUser, ProfileUpdate, StoreError, UserStore};
