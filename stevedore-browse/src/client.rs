//! Object storage client seam

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

use stevedore_profiles::StorageProfile;

/// Errors from remote object-storage calls
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Remote call failed: {0}")]
    Remote(String),
}

/// One content entry returned by a listing call
#[derive(Debug, Clone)]
pub struct RemoteObject {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Result of a single delimiter-scoped listing call
#[derive(Debug, Clone, Default)]
pub struct ListOutcome {
    pub objects: Vec<RemoteObject>,
    pub common_prefixes: Vec<String>,
}

/// Abstract object-storage client
///
/// The console treats the remote endpoint as opaque and speaks only this
/// request/response shape.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Issue one list-objects call scoped by prefix and delimiter
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<ListOutcome, ClientError>;

    /// Upload an object
    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), ClientError>;

    /// Download an object
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, ClientError>;

    /// Delete a single object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ClientError>;

    /// Create a bucket
    async fn create_bucket(&self, bucket: &str) -> Result<(), ClientError>;
}

/// Builds a client from a profile's credentials
///
/// A seam so handlers can be exercised without a live endpoint.
pub trait ClientFactory: Send + Sync {
    fn client_for(&self, profile: &StorageProfile) -> Arc<dyn ObjectClient>;
}
