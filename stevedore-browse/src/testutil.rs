//! Scripted object client for tests

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use stevedore_profiles::StorageProfile;

use crate::client::{ClientError, ClientFactory, ListOutcome, ObjectClient};

/// Object client with a canned listing result
pub struct MockClient {
    outcome: ListOutcome,
    object_body: Bytes,
    fail: bool,
}

impl MockClient {
    pub fn returning(outcome: ListOutcome) -> Self {
        Self {
            outcome,
            object_body: Bytes::new(),
            fail: false,
        }
    }

    pub fn with_object_body(mut self, body: impl Into<Bytes>) -> Self {
        self.object_body = body.into();
        self
    }

    /// Every call fails with a remote error
    pub fn failing() -> Self {
        Self {
            outcome: ListOutcome::default(),
            object_body: Bytes::new(),
            fail: true,
        }
    }

    fn check(&self) -> Result<(), ClientError> {
        if self.fail {
            return Err(ClientError::Remote("simulated endpoint failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectClient for MockClient {
    async fn list_objects(
        &self,
        _bucket: &str,
        _prefix: &str,
        _delimiter: &str,
    ) -> Result<ListOutcome, ClientError> {
        self.check()?;
        Ok(self.outcome.clone())
    }

    async fn put_object(&self, _bucket: &str, _key: &str, _data: Bytes) -> Result<(), ClientError> {
        self.check()
    }

    async fn get_object(&self, _bucket: &str, _key: &str) -> Result<Bytes, ClientError> {
        self.check()?;
        Ok(self.object_body.clone())
    }

    async fn delete_object(&self, _bucket: &str, _key: &str) -> Result<(), ClientError> {
        self.check()
    }

    async fn create_bucket(&self, _bucket: &str) -> Result<(), ClientError> {
        self.check()
    }
}

/// Factory that hands out one shared mock regardless of profile
pub struct MockFactory {
    client: Arc<MockClient>,
}

impl MockFactory {
    pub fn new(client: MockClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl ClientFactory for MockFactory {
    fn client_for(&self, _profile: &StorageProfile) -> Arc<dyn ObjectClient> {
        self.client.clone()
    }
}
