//! HTTP router for the stevedore console

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use stevedore_browse::{handlers as browse, BrowseState, S3ClientFactory};
use stevedore_core::{ConsoleError, ErrorCode};
use stevedore_profiles::{handlers as profiles, ProfileStore, ProfilesState};

/// Service state for the main router
pub struct AppState {
    profiles: Arc<ProfilesState>,
    browse: Arc<BrowseState>,
}

impl AppState {
    pub fn new(store: Arc<ProfileStore>) -> Self {
        Self {
            profiles: Arc::new(ProfilesState::new(store.clone())),
            browse: Arc::new(BrowseState::new(store, Arc::new(S3ClientFactory))),
        }
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Profile CRUD; one path position serves id (GET) and name (PATCH/DELETE)
        .route("/api/profiles", get(list_profiles).post(create_profile))
        .route(
            "/api/profiles/{selector}",
            get(get_profile).patch(update_profile).delete(delete_profile),
        )
        // Bucket browsing and object actions
        .route("/api/profiles/{selector}/browse", get(browse_prefix))
        .route("/api/profiles/{selector}/bucket", post(create_bucket))
        .route(
            "/api/profiles/{selector}/objects/{*key}",
            get(download_object).post(upload_object).delete(delete_object),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, r#"{"status": "running"}"#)
}

#[derive(Debug, Deserialize, Default)]
struct BrowseQuery {
    prefix: Option<String>,
}

// === Profile routes ===

async fn create_profile(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    profiles::create_profile(state.profiles.clone(), body).await
}

async fn list_profiles(State(state): State<Arc<AppState>>) -> Response {
    profiles::list_profiles(state.profiles.clone()).await
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(selector): Path<String>,
) -> Response {
    match parse_id(&selector) {
        Ok(id) => profiles::get_profile(state.profiles.clone(), id).await,
        Err(response) => response,
    }
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(selector): Path<String>,
    body: Bytes,
) -> Response {
    profiles::update_profile(state.profiles.clone(), &selector, body).await
}

async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Path(selector): Path<String>,
) -> Response {
    profiles::delete_profile(state.profiles.clone(), &selector).await
}

// === Browse routes ===

async fn browse_prefix(
    State(state): State<Arc<AppState>>,
    Path(selector): Path<String>,
    Query(query): Query<BrowseQuery>,
) -> Response {
    match parse_id(&selector) {
        Ok(id) => {
            browse::browse(state.browse.clone(), id, query.prefix.as_deref().unwrap_or("")).await
        }
        Err(response) => response,
    }
}

async fn upload_object(
    State(state): State<Arc<AppState>>,
    Path((selector, key)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    match parse_id(&selector) {
        Ok(id) => browse::upload_object(state.browse.clone(), id, &key, body).await,
        Err(response) => response,
    }
}

async fn download_object(
    State(state): State<Arc<AppState>>,
    Path((selector, key)): Path<(String, String)>,
) -> Response {
    match parse_id(&selector) {
        Ok(id) => browse::download_object(state.browse.clone(), id, &key).await,
        Err(response) => response,
    }
}

async fn delete_object(
    State(state): State<Arc<AppState>>,
    Path((selector, key)): Path<(String, String)>,
) -> Response {
    match parse_id(&selector) {
        Ok(id) => browse::delete_object(state.browse.clone(), id, &key).await,
        Err(response) => response,
    }
}

async fn create_bucket(
    State(state): State<Arc<AppState>>,
    Path(selector): Path<String>,
) -> Response {
    match parse_id(&selector) {
        Ok(id) => browse::create_bucket(state.browse.clone(), id).await,
        Err(response) => response,
    }
}

fn parse_id(selector: &str) -> Result<i64, Response> {
    selector.parse::<i64>().map_err(|_| {
        let error = ConsoleError::new(ErrorCode::Validation, "Profile id must be numeric")
            .with_resource(selector);
        Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .header("content-type", "application/json")
            .body(Body::from(error.to_json()))
            .unwrap()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let store = Arc::new(ProfileStore::open_in_memory().unwrap());
        create_router(AppState::new(store))
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_router();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_profile_crud_round_trip() {
        let app = test_router();

        let create = Request::builder()
            .method("POST")
            .uri("/api/profiles")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"name":"minio-local","endpoint":"http://localhost","port":"9000",
                    "access_key":"ak","secret_key":"sk","bucket_name":"data"}"#,
            ))
            .unwrap();
        let response = app.clone().oneshot(create).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let list = Request::builder()
            .uri("/api/profiles")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(list).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8(body.to_vec())
            .unwrap()
            .contains(r#""name":"minio-local""#));

        let delete = Request::builder()
            .method("DELETE")
            .uri("/api/profiles/minio-local")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(delete).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_browse_rejects_non_numeric_id() {
        let app = test_router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/profiles/minio-local/browse")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
