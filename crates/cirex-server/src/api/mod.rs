mod extract;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use cirex_core::AppConfig;
use cirex_extract::ExtractClient;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::request_id;

/// Generous outer body cap: fits the 10 MB document limit enforced in the
/// extract handlers plus base64 and multipart overhead.
const REQUEST_BODY_LIMIT: usize = 16 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Absent when no upstream endpoint is configured; extraction requests
    /// then fail with `not_configured` without affecting the process.
    pub extractor: Option<Arc<ExtractClient>>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "bad_gateway" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        layer.allow_origin(tower_http::cors::Any)
    } else {
        let origins = allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok());
        layer.allow_origin(tower_http::cors::AllowOrigin::list(origins))
    }
}

pub fn build_app(state: AppState) -> Router {
    let cors = build_cors(&state.config.allowed_origins);

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/health/ready", get(ready))
        .route("/api/extract", post(extract::extract_upload))
        .route("/api/extract/base64", post(extract::extract_base64))
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(axum::middleware::from_fn(request_id)),
        )
        .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT))
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Commercial Invoice Extraction Relay",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "ready": "/api/health/ready",
            "extract": "/api/extract",
            "extract_base64": "/api/extract/base64"
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "extractor": if state.extractor.is_some() {
            "configured"
        } else {
            "not configured"
        }
    }))
}

async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match &state.extractor {
        Some(client) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ready",
                "timestamp": Utc::now(),
                "extractor_endpoint": client.endpoint()
            })),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "status": "not ready",
                "reason": "CIREX_EXTRACTOR_ENDPOINT not configured",
                "timestamp": Utc::now()
            })),
        ),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    pub(crate) fn test_config() -> AppConfig {
        AppConfig {
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "info".to_string(),
            allowed_origins: vec!["http://localhost:3001".to_string()],
            extractor_endpoint: None,
            extractor_api_key: None,
            extractor_timeout_secs: 5,
        }
    }

    pub(crate) fn test_state(extractor: Option<ExtractClient>) -> AppState {
        AppState {
            config: Arc::new(test_config()),
            extractor: extractor.map(Arc::new),
        }
    }

    pub(crate) async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json parse")
    }

    #[tokio::test]
    async fn health_reports_unconfigured_extractor() {
        let app = build_app(test_state(None));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"].as_str(), Some("healthy"));
        assert_eq!(json["extractor"].as_str(), Some("not configured"));
    }

    #[tokio::test]
    async fn health_reports_configured_extractor() {
        let client = ExtractClient::new("https://extract.example.com/v1", None, 5).expect("client");
        let app = build_app(test_state(Some(client)));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        let json = body_json(response).await;
        assert_eq!(json["extractor"].as_str(), Some("configured"));
    }

    #[tokio::test]
    async fn readiness_is_503_without_endpoint() {
        let app = build_app(test_state(None));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["status"].as_str(), Some("not ready"));
    }

    #[tokio::test]
    async fn readiness_is_ok_with_endpoint() {
        let client = ExtractClient::new("https://extract.example.com/v1", None, 5).expect("client");
        let app = build_app(test_state(Some(client)));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health/ready")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json["extractor_endpoint"].as_str(),
            Some("https://extract.example.com/v1")
        );
    }

    #[tokio::test]
    async fn root_lists_endpoints() {
        let app = build_app(test_state(None));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["endpoints"]["extract"].as_str(), Some("/api/extract"));
    }

    #[tokio::test]
    async fn responses_carry_request_id_header() {
        let app = build_app(test_state(None));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("x-request-id", "req-abc-123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-abc-123")
        );
    }

    #[test]
    fn api_error_bad_gateway_maps_to_502() {
        let response = ApiError::new("req-1", "bad_gateway", "upstream failed").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn api_error_validation_error_maps_to_400() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_not_configured_maps_to_500() {
        let response = ApiError::new("req-1", "not_configured", "endpoint unset").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
