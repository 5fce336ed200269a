//! HTTP handler for the Protect API
//!
//! - POST /v1/protect - deposit a payload under a policy
//!
//! Request body:
//! ```json
//! {"target": "secret", "policyId": "pii-basic", "collectionId": "col1"}
//! ```

use crate::api::error_response;
use crate::error::ApiError;
use crate::protect::orchestrator::ProtectOrchestrator;
use crate::protect::types::{ProtectError, ProtectRequest, ProtectResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Shared state for the protect handler
#[derive(Clone)]
pub struct ProtectState {
    pub orchestrator: Arc<ProtectOrchestrator>,
    /// Deadline applied to each protect call
    pub request_timeout: Duration,
}

/// Create the protect router
pub fn protect_router(state: ProtectState) -> Router {
    Router::new()
        .route("/v1/protect", post(protect))
        .with_state(state)
}

/// Protect request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectBody {
    #[serde(default, alias = "payload")]
    pub target: String,
    #[serde(default)]
    pub policy_id: String,
    #[serde(default)]
    pub collection_id: String,
}

impl From<ProtectBody> for ProtectRequest {
    fn from(body: ProtectBody) -> Self {
        ProtectRequest::new(body.target.into_bytes(), body.policy_id, body.collection_id)
    }
}

fn status_for(err: &ProtectError) -> StatusCode {
    match err {
        ProtectError::Validation(_) => StatusCode::BAD_REQUEST,
        ProtectError::PolicyNotFound(_) => StatusCode::NOT_FOUND,
        ProtectError::Cancelled { .. } => StatusCode::GATEWAY_TIMEOUT,
        ProtectError::Storage(_)
        | ProtectError::VaultWriteFailed(_)
        | ProtectError::RegistryWriteFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /v1/protect
async fn protect(
    State(state): State<ProtectState>,
    body: Result<Json<ProtectBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ApiError::bad_request(format!("invalid protect request: {}", rejection.body_text())),
            );
        }
    };

    match state
        .orchestrator
        .protect_within(body.into(), state.request_timeout)
        .await
    {
        Ok(id) => (StatusCode::OK, Json(ProtectResponse { id })).into_response(),
        Err(err) => {
            if err.is_client_error() {
                tracing::info!(code = err.code(), "Protect request rejected: {}", err);
            } else {
                tracing::error!(
                    code = err.code(),
                    stage = %err.stage(),
                    "Protect request failed: {}",
                    err
                );
            }
            error_response(status_for(&err), ApiError::new(err.code(), err.public_message()))
        }
    }
}
