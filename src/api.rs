//! Unified API router for Gatekeeper
//!
//! Merges all module routers into a single axum `Router` with CORS,
//! request tracing, and consistent error bodies.
//!
//! ## Endpoint Map
//!
//! | Path                       | Module    | Description                   |
//! |----------------------------|-----------|-------------------------------|
//! | `/healthcheck`             | api       | Liveness probe                |
//! | `/v1/protect`              | protect   | Deposit a payload under a policy |
//! | `/v1/policy/:policy_id`    | policy    | Policy create/replace, fetch  |
//! | `/v1/protected/:id`        | protected | Protected-data record detail  |

use crate::error::ApiError;
use crate::policy::{policy_router, PolicyState};
use crate::protect::{protect_router, ProtectState};
use crate::protected::{protected_router, ProtectedState};
use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Gatekeeper HTTP application
pub fn build_app(
    policy_state: PolicyState,
    protect_state: ProtectState,
    protected_state: ProtectedState,
    cors_origins: &[String],
) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .merge(policy_router(policy_state))
        .merge(protect_router(protect_state))
        .merge(protected_router(protected_state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(cors_origins))
}

/// Render an error body with the given status
pub(crate) fn error_response(status: StatusCode, error: ApiError) -> Response {
    (status, Json(error)).into_response()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    current_time: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "success".to_string(),
        current_time: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PolicyStore;
    use crate::protect::ProtectOrchestrator;
    use crate::protected::ProtectedDataStore;
    use crate::store::MemoryStoreProvider;
    use crate::vault::MemoryVault;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let provider = MemoryStoreProvider::new();
        let policies = Arc::new(PolicyStore::open(&provider).await.unwrap());
        let records = Arc::new(ProtectedDataStore::open(&provider).await.unwrap());
        let orchestrator = Arc::new(ProtectOrchestrator::new(
            policies.clone(),
            records.clone(),
            Arc::new(MemoryVault::new()),
        ));
        build_app(
            PolicyState { store: policies },
            ProtectState {
                orchestrator,
                request_timeout: Duration::from_secs(5),
            },
            ProtectedState { store: records },
            &[],
        )
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let resp = app.clone().oneshot(request).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 64)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            Request::builder()
                .uri("/healthcheck")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json["currentTime"].is_string());
    }

    #[tokio::test]
    async fn test_policy_then_protect_then_record() {
        let app = test_app().await;

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                "/v1/policy/PII-Basic",
                serde_json::json!({"rules": ["mask-email"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/v1/protect",
                serde_json::json!({
                    "target": "alice@example.com",
                    "policyId": "pii-basic",
                    "collectionId": "customers"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let id = json["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Request::builder()
                .uri(format!("/v1/protected/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let record: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(record["policyId"], "pii-basic");
        assert_eq!(record["collectionId"], "customers");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            Request::builder()
                .uri("/v1/policy/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert!(json["message"].is_string());
    }

    #[test]
    fn test_build_cors_with_origins() {
        let _cors = build_cors(&[
            "http://localhost:3000".to_string(),
            "https://app.example.com".to_string(),
        ]);
    }
}
