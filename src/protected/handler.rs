//! HTTP handler for reading protected-data records
//!
//! - GET /v1/protected/:id - record detail

use crate::api::error_response;
use crate::error::ApiError;
use crate::protected::store::ProtectedDataStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Shared state for protected-data handlers
#[derive(Clone)]
pub struct ProtectedState {
    pub store: Arc<ProtectedDataStore>,
}

/// Create the protected-data router
pub fn protected_router(state: ProtectedState) -> Router {
    Router::new()
        .route("/v1/protected/:id", get(get_protected))
        .with_state(state)
}

/// GET /v1/protected/:id
async fn get_protected(State(state): State<ProtectedState>, Path(id): Path<String>) -> Response {
    match state.store.get(&id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) if e.is_not_found() => error_response(
            StatusCode::NOT_FOUND,
            ApiError::not_found(format!("Protected data '{}' not found", id)),
        ),
        Err(e) => {
            tracing::error!(id = %id, error = %e, "Failed to read protected data");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal("read protected data failed"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protected::ProtectedData;
    use crate::store::MemoryStoreProvider;
    use crate::vault::VaultRef;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_get_protected() {
        let store = Arc::new(
            ProtectedDataStore::open(&MemoryStoreProvider::new())
                .await
                .unwrap(),
        );
        let id = store
            .create(ProtectedData::new("pii-basic", VaultRef::new("ref-1"), "col1"))
            .await
            .unwrap();
        let app = protected_router(ProtectedState { store });

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/v1/protected/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 1024 * 64)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["id"], id.as_str());
        assert_eq!(json["policyId"], "pii-basic");
        assert_eq!(json["vaultRef"], "ref-1");
        assert_eq!(json["collectionId"], "col1");

        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/v1/protected/unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
