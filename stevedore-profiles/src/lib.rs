//! Storage profile persistence for the stevedore console
//!
//! Persists named connection profiles for S3-compatible backends in a
//! SQLite table and exposes the profile CRUD handlers.

pub mod handlers;
mod store;

pub use handlers::ProfilesState;
pub use store::{NewProfile, ProfileError, ProfileStore, ProfileUpdate, StorageProfile};
