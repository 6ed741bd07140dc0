//! HTTP handlers for bucket browsing and object actions

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use stevedore_core::{ConsoleError, ErrorCode};
use stevedore_profiles::{ProfileError, ProfileStore, StorageProfile};

use crate::client::{ClientError, ClientFactory, ObjectClient};
use crate::listing::{human_size, list_entries, EntryKind};

/// Shared state for browse handlers
pub struct BrowseState {
    pub profiles: Arc<ProfileStore>,
    pub clients: Arc<dyn ClientFactory>,
}

impl BrowseState {
    pub fn new(profiles: Arc<ProfileStore>, clients: Arc<dyn ClientFactory>) -> Self {
        Self { profiles, clients }
    }

    fn resolve(&self, id: i64) -> Result<(StorageProfile, Arc<dyn ObjectClient>), ConsoleError> {
        let profile = self.profiles.get_by_id(id).map_err(|e| match e {
            ProfileError::NotFound(_) => {
                ConsoleError::new(ErrorCode::NotFound, "No such profile")
                    .with_resource(id.to_string())
            }
            e => ConsoleError::new(ErrorCode::Persistence, e.to_string()),
        })?;
        let client = self.clients.client_for(&profile);
        Ok((profile, client))
    }
}

// === Response types ===

#[derive(Debug, Serialize)]
struct BrowseRow {
    key: String,
    kind: EntryKind,
    display_name: String,
    size_bytes: u64,
    size: String,
    last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct BrowseResponse {
    bucket: String,
    prefix: String,
    entries: Vec<BrowseRow>,
}

// === Handlers ===

/// List one level of the profile's bucket under `prefix`
pub async fn browse(state: Arc<BrowseState>, id: i64, prefix: &str) -> Response {
    let (profile, client) = match state.resolve(id) {
        Ok(resolved) => resolved,
        Err(e) => return error_response(&e),
    };

    info!(profile = %profile.name, prefix = %prefix, "browse request");

    let entries = list_entries(client.as_ref(), &profile.bucket_name, prefix)
        .await
        .into_iter()
        .map(|entry| BrowseRow {
            size: human_size(entry.size_bytes),
            key: entry.key,
            kind: entry.kind,
            display_name: entry.display_name,
            size_bytes: entry.size_bytes,
            last_modified: entry.last_modified,
        })
        .collect();

    json_response(
        StatusCode::OK,
        &BrowseResponse {
            bucket: profile.bucket_name,
            prefix: prefix.to_string(),
            entries,
        },
    )
}

/// Upload the request body as an object
pub async fn upload_object(state: Arc<BrowseState>, id: i64, key: &str, body: Bytes) -> Response {
    let (profile, client) = match state.resolve(id) {
        Ok(resolved) => resolved,
        Err(e) => return error_response(&e),
    };

    match client.put_object(&profile.bucket_name, key, body).await {
        Ok(()) => {
            info!(profile = %profile.name, key = %key, "object uploaded");
            Response::builder()
                .status(StatusCode::OK)
                .body(Body::empty())
                .unwrap()
        }
        Err(e) => error_response(&remote_error(e, key)),
    }
}

/// Download an object as an octet stream
pub async fn download_object(state: Arc<BrowseState>, id: i64, key: &str) -> Response {
    let (profile, client) = match state.resolve(id) {
        Ok(resolved) => resolved,
        Err(e) => return error_response(&e),
    };

    match client.get_object(&profile.bucket_name, key).await {
        Ok(data) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .header(header::CONTENT_LENGTH, data.len().to_string())
            .body(Body::from(data))
            .unwrap(),
        Err(e) => error_response(&remote_error(e, key)),
    }
}

/// Delete a single object
pub async fn delete_object(state: Arc<BrowseState>, id: i64, key: &str) -> Response {
    let (profile, client) = match state.resolve(id) {
        Ok(resolved) => resolved,
        Err(e) => return error_response(&e),
    };

    match client.delete_object(&profile.bucket_name, key).await {
        Ok(()) => {
            info!(profile = %profile.name, key = %key, "object deleted");
            Response::builder()
                .status(StatusCode::NO_CONTENT)
                .body(Body::empty())
                .unwrap()
        }
        Err(e) => error_response(&remote_error(e, key)),
    }
}

/// Create the profile's bucket on the remote endpoint
pub async fn create_bucket(state: Arc<BrowseState>, id: i64) -> Response {
    let (profile, client) = match state.resolve(id) {
        Ok(resolved) => resolved,
        Err(e) => return error_response(&e),
    };

    match client.create_bucket(&profile.bucket_name).await {
        Ok(()) => {
            info!(profile = %profile.name, bucket = %profile.bucket_name, "bucket created");
            json_response(
                StatusCode::OK,
                &serde_json::json!({ "bucket": profile.bucket_name }),
            )
        }
        Err(e) => error_response(&remote_error(e, &profile.bucket_name)),
    }
}

// === Helper Functions ===

fn remote_error(e: ClientError, resource: &str) -> ConsoleError {
    ConsoleError::new(ErrorCode::RemoteCall, e.to_string()).with_resource(resource)
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn error_response(error: &ConsoleError) -> Response {
    Response::builder()
        .status(
            StatusCode::from_u16(error.code.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        )
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(error.to_json()))
        .unwrap()
}
