//! HTTP handlers for profile CRUD

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use stevedore_core::{ConsoleError, ErrorCode};

use crate::store::{NewProfile, ProfileError, ProfileStore, ProfileUpdate, StorageProfile};

/// Shared state for profile handlers
pub struct ProfilesState {
    pub store: Arc<ProfileStore>,
}

impl ProfilesState {
    pub fn new(store: Arc<ProfileStore>) -> Self {
        Self { store }
    }
}

// === Request/Response types ===

#[derive(Debug, Deserialize)]
struct CreateProfileRequest {
    name: String,
    endpoint: String,
    port: Option<String>,
    access_key: String,
    secret_key: String,
    region: Option<String>,
    bucket_name: String,
}

#[derive(Debug, Deserialize, Default)]
struct UpdateProfileRequest {
    endpoint: Option<String>,
    port: Option<String>,
    access_key: Option<String>,
    secret_key: Option<String>,
    region: Option<String>,
    bucket_name: Option<String>,
}

/// Profile as rendered to the console; the secret key is never echoed back
#[derive(Debug, Serialize)]
struct ProfileResponse {
    id: i64,
    name: String,
    endpoint: String,
    port: Option<String>,
    access_key: String,
    region: Option<String>,
    bucket_name: String,
}

impl From<StorageProfile> for ProfileResponse {
    fn from(profile: StorageProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            endpoint: profile.endpoint,
            port: profile.port,
            access_key: profile.access_key,
            region: profile.region,
            bucket_name: profile.bucket_name,
        }
    }
}

// === Handlers ===

pub async fn create_profile(state: Arc<ProfilesState>, body: Bytes) -> Response {
    let request: CreateProfileRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return error_response(&ConsoleError::new(
                ErrorCode::Validation,
                format!("Malformed profile body: {}", e),
            ))
        }
    };

    let new_profile = NewProfile {
        name: request.name,
        endpoint: request.endpoint,
        port: request.port,
        access_key: request.access_key,
        secret_key: request.secret_key,
        region: request.region,
        bucket_name: request.bucket_name,
    };

    match state.store.save(new_profile) {
        Ok(profile) => {
            info!(name = %profile.name, id = profile.id, "profile created");
            json_response(StatusCode::CREATED, &ProfileResponse::from(profile))
        }
        Err(e) => error_response(&console_error(e)),
    }
}

pub async fn list_profiles(state: Arc<ProfilesState>) -> Response {
    let profiles: Vec<ProfileResponse> = state
        .store
        .list()
        .into_iter()
        .map(ProfileResponse::from)
        .collect();
    json_response(StatusCode::OK, &profiles)
}

pub async fn get_profile(state: Arc<ProfilesState>, id: i64) -> Response {
    match state.store.get_by_id(id) {
        Ok(profile) => json_response(StatusCode::OK, &ProfileResponse::from(profile)),
        Err(e) => error_response(&console_error(e)),
    }
}

pub async fn update_profile(state: Arc<ProfilesState>, name: &str, body: Bytes) -> Response {
    let request: UpdateProfileRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return error_response(&ConsoleError::new(
                ErrorCode::Validation,
                format!("Malformed update body: {}", e),
            ))
        }
    };

    let update = ProfileUpdate {
        endpoint: request.endpoint,
        port: request.port,
        access_key: request.access_key,
        secret_key: request.secret_key,
        region: request.region,
        bucket_name: request.bucket_name,
    };

    match state.store.update(name, &update) {
        Ok(profile) => {
            info!(name = %name, "profile updated");
            json_response(StatusCode::OK, &ProfileResponse::from(profile))
        }
        // Nothing to update is an expected outcome, not a fault
        Err(ProfileError::NotFound(_)) => {
            warn!(name = %name, "update target not found");
            error_response(
                &ConsoleError::new(ErrorCode::NotFound, "No profile with that name")
                    .with_resource(name),
            )
        }
        Err(e) => error_response(&console_error(e)),
    }
}

pub async fn delete_profile(state: Arc<ProfilesState>, name: &str) -> Response {
    match state.store.delete(name) {
        Ok(()) => {
            info!(name = %name, "profile deleted");
            Response::builder()
                .status(StatusCode::NO_CONTENT)
                .body(Body::empty())
                .unwrap()
        }
        Err(ProfileError::NotFound(_)) => {
            warn!(name = %name, "delete target not found");
            error_response(
                &ConsoleError::new(ErrorCode::NotFound, "No profile with that name")
                    .with_resource(name),
            )
        }
        Err(e) => error_response(&console_error(e)),
    }
}

// === Helper Functions ===

fn console_error(e: ProfileError) -> ConsoleError {
    match e {
        ProfileError::DuplicateName(name) => {
            ConsoleError::new(ErrorCode::DuplicateName, "Profile with this name already exists")
                .with_resource(name)
        }
        ProfileError::NotFound(target) => {
            ConsoleError::new(ErrorCode::NotFound, "No such profile").with_resource(target)
        }
        ProfileError::Validation(message) => ConsoleError::new(ErrorCode::Validation, message),
        ProfileError::Persistence(e) => ConsoleError::new(ErrorCode::Persistence, e.to_string()),
    }
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
        .status(StatusCode::from_u16(error.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(error.to_json()))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> Arc<ProfilesState> {
        let store = Arc::new(ProfileStore::open_in_memory().unwrap());
        Arc::new(ProfilesState::new(store))
    }

    fn create_body(name: &str) -> Bytes {
        Bytes::from(format!(
            r#"{{"name":"{}","endpoint":"http://localhost","port":"9000",
                "access_key":"ak","secret_key":"sk","region":"us-east-1",
                "bucket_name":"data"}}"#,
            name
        ))
    }

    #[tokio::test]
    async fn test_create_profile_redacts_secret() {
        let state = test_state();

        let response = create_profile(state, create_body("minio-local")).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains(r#""name":"minio-local""#));
        assert!(!text.contains("secret_key"));
        assert!(!text.contains(r#""sk""#));
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let state = test_state();

        create_profile(state.clone(), create_body("minio-local")).await;
        let response = create_profile(state, create_body("minio-local")).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_missing_profile_is_not_found() {
        let state = test_state();

        let response = delete_profile(state, "ghost").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_create_body_is_validation_error() {
        let state = test_state();

        let response = create_profile(state, Bytes::from_static(b"not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
