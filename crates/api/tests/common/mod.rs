//! Shared helpers for API integration tests.
//!
//! Builds the app through the production [`build_app_router`] so tests
//! exercise the same middleware stack (CORS, request ID, timeout, tracing,
//! panic recovery) the binary uses, with a stub extractor in place of the
//! hosted AI service.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use worksite_api::auth::jwt::{generate_access_token, JwtConfig};
use worksite_api::config::ServerConfig;
use worksite_api::router::build_app_router;
use worksite_api::state::AppState;
use worksite_api::ws::WsManager;
use worksite_db::models::project::CreateProject;
use worksite_db::models::user::CreateUser;
use worksite_db::repositories::{ProjectRepo, UserRepo};
use worksite_extractor::{ExtractedField, ExtractorError, FieldExtractor};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Deterministic extractor: always suggests the same two candidates.
pub struct StubExtractor;

#[async_trait::async_trait]
impl FieldExtractor for StubExtractor {
    async fn extract_fields(&self, _text: &str) -> Result<Vec<ExtractedField>, ExtractorError> {
        Ok(vec![
            ExtractedField {
                field_name: "client_name".to_string(),
                extracted_value: "Acme Corp".to_string(),
                confidence_score: 0.92,
            },
            ExtractedField {
                field_name: "budget".to_string(),
                extracted_value: "12500".to_string(),
                confidence_score: 0.71,
            },
        ])
    }
}

/// Build the full application router backed by the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(worksite_events::EventBus::default()),
        extractor: Arc::new(StubExtractor),
    };
    build_app_router(state, &config)
}

/// A `Bearer ...` header value for the given user.
pub fn bearer(user_id: i64, role: &str) -> String {
    let token = generate_access_token(user_id, role, &test_config().jwt)
        .expect("token generation should succeed");
    format!("Bearer {token}")
}

/// Seed a user directly through the repository.
pub async fn seed_user(pool: &PgPool, email: &str, role: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            full_name: "API Test User".to_string(),
            role: Some(role.to_string()),
        },
    )
    .await
    .expect("user insert should succeed")
    .id
}

/// Seed a draft project directly through the repository.
pub async fn seed_project(pool: &PgPool, created_by: i64) -> i64 {
    ProjectRepo::create(
        pool,
        &CreateProject {
            name: "Garage Conversion".to_string(),
            description: None,
            client_name: "Acme".to_string(),
            client_email: "office@acme.test".to_string(),
            client_phone: None,
        },
        created_by,
    )
    .await
    .expect("project insert should succeed")
    .id
}

/// Issue one request against the app and return status + parsed JSON body.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(header) = auth {
        builder = builder.header("authorization", header);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should complete");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
