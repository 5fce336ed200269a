//! HTTP handlers for the Policy API
//!
//! - PUT /v1/policy/:policy_id - create or replace a policy
//! - GET /v1/policy/:policy_id - fetch a policy

use crate::api::error_response;
use crate::error::ApiError;
use crate::policy::store::PolicyStore;
use crate::policy::types::PolicyDocument;
use crate::store::StoreError;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Shared state for policy handlers
#[derive(Clone)]
pub struct PolicyState {
    pub store: Arc<PolicyStore>,
}

/// Create the policy router
pub fn policy_router(state: PolicyState) -> Router {
    Router::new()
        .route("/v1/policy/:policy_id", get(get_policy).put(put_policy))
        .with_state(state)
}

/// PUT /v1/policy/:policy_id
async fn put_policy(
    State(state): State<PolicyState>,
    Path(policy_id): Path<String>,
    body: Result<Json<PolicyDocument>, JsonRejection>,
) -> Response {
    let Json(document) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ApiError::bad_request(format!("invalid policy document: {}", rejection.body_text())),
            );
        }
    };

    let policy_id = PolicyStore::normalize_id(&policy_id);

    match state.store.put(&policy_id, &document).await {
        Ok(()) => {
            tracing::info!(policy_id = %policy_id, "Policy stored");
            StatusCode::OK.into_response()
        }
        Err(StoreError::InvalidKey(reason)) => error_response(
            StatusCode::BAD_REQUEST,
            ApiError::bad_request(format!("invalid policy id: {}", reason)),
        ),
        Err(e) => {
            tracing::error!(policy_id = %policy_id, error = %e, "Failed to store policy");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal("store policy failed"),
            )
        }
    }
}

/// GET /v1/policy/:policy_id
async fn get_policy(State(state): State<PolicyState>, Path(policy_id): Path<String>) -> Response {
    match state.store.get(&policy_id).await {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(e) if e.is_not_found() => error_response(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!(
                "Policy '{}' not found",
                PolicyStore::normalize_id(&policy_id)
            )),
        ),
        Err(e) => {
            tracing::error!(policy_id = %policy_id, error = %e, "Failed to read policy");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal("read policy failed"),
            )
        }
    }
}
