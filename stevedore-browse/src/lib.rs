//! Bucket browsing for the stevedore console
//!
//! Wraps the S3 SDK behind an [`ObjectClient`] seam, turns one
//! delimiter-scoped listing call into display-ready folder/file entries,
//! and exposes the browse/upload/download/delete handlers.

pub mod client;
pub mod handlers;
pub mod listing;
mod s3;

#[cfg(test)]
pub(crate) mod testutil;

pub use client::{ClientError, ClientFactory, ListOutcome, ObjectClient, RemoteObject};
pub use handlers::BrowseState;
pub use listing::{human_size, list_entries, EntryKind, ListingEntry};
pub use s3::{S3Client, S3ClientFactory};
