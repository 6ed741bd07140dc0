//! S3 SDK implementation of the object client

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::DateTime;
use std::sync::Arc;

use stevedore_profiles::StorageProfile;

use crate::client::{ClientError, ClientFactory, ListOutcome, ObjectClient, RemoteObject};

const DEFAULT_REGION: &str = "us-east-1";

/// Object client backed by the AWS S3 SDK
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Build a client from a profile's endpoint and credentials
    pub fn from_profile(profile: &StorageProfile) -> Self {
        let endpoint = match profile.port.as_deref().filter(|p| !p.is_empty()) {
            Some(port) => format!("{}:{}", profile.endpoint.trim_end_matches('/'), port),
            None => profile.endpoint.clone(),
        };
        let region = profile
            .region
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let credentials = Credentials::new(
            profile.access_key.clone(),
            profile.secret_key.clone(),
            None,
            None,
            "stevedore-profile",
        );

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(Region::new(region))
            .credentials_provider(credentials)
            // MinIO and friends do not resolve virtual-hosted bucket names
            .force_path_style(true)
            .build();

        Self {
            inner: aws_sdk_s3::Client::from_conf(config),
        }
    }
}

#[async_trait]
impl ObjectClient for S3Client {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<ListOutcome, ClientError> {
        let mut req = self.inner.list_objects_v2().bucket(bucket).delimiter(delimiter);
        if !prefix.is_empty() {
            req = req.prefix(prefix);
        }

        let out = req
            .send()
            .await
            .map_err(|e| ClientError::Remote(format!("list_objects at '{}': {}", prefix, e)))?;

        let objects = out
            .contents()
            .iter()
            .map(|o| RemoteObject {
                key: o.key().unwrap_or_default().to_string(),
                size: o.size().unwrap_or(0).max(0) as u64,
                last_modified: o
                    .last_modified()
                    .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
            })
            .collect();

        let common_prefixes = out
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(String::from))
            .collect();

        Ok(ListOutcome {
            objects,
            common_prefixes,
        })
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), ClientError> {
        self.inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| ClientError::Remote(format!("put_object '{}': {}", key, e)))?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, ClientError> {
        let out = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ClientError::Remote(format!("get_object '{}': {}", key, e)))?;

        let data = out
            .body
            .collect()
            .await
            .map_err(|e| ClientError::Remote(format!("collect body '{}': {}", key, e)))?;

        Ok(data.into_bytes())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        self.inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| ClientError::Remote(format!("delete_object '{}': {}", key, e)))?;
        Ok(())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        self.inner
            .create_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| ClientError::Remote(format!("create_bucket '{}': {}", bucket, e)))?;
        Ok(())
    }
}

/// Default factory: one fresh SDK client per profile
pub struct S3ClientFactory;

impl ClientFactory for S3ClientFactory {
    fn client_for(&self, profile: &StorageProfile) -> Arc<dyn ObjectClient> {
        Arc::new(S3Client::from_profile(profile))
    }
}
