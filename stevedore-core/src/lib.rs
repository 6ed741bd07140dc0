//! Core types for the stevedore console
//!
//! This crate provides the error taxonomy shared by all stevedore services.

pub mod error;

pub use error::{ConsoleError, ErrorCode};
