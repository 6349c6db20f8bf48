//! HTTP surface - router, handlers, and error mapping
//!
//! Validation failures map to 400 with a field-specific message; embedding
//! or index failures map to 500 with the underlying message in `details`.
//! Errors are logged before being mapped.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::error::Error;
use crate::service::{MemoryService, RecallRequest, RecallResponse, StoreRequest, StoreResponse};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MemoryService>,
}

// ---- Error Handling ----

struct AppError(Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);

        if self.0.is_client_error() {
            let body = Json(serde_json::json!({ "error": self.0.to_string() }));
            (StatusCode::BAD_REQUEST, body).into_response()
        } else {
            let summary = match &self.0 {
                Error::Embedding(_) => "embedding provider failure",
                Error::Index(_) => "vector index failure",
                _ => "internal error",
            };
            let body = Json(serde_json::json!({
                "error": summary,
                "details": self.0.to_string(),
            }));
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError(err)
    }
}

// ---- Handlers ----

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn store_memory(
    State(state): State<AppState>,
    Json(request): Json<StoreRequest>,
) -> Result<Json<StoreResponse>, AppError> {
    let response = state.service.store(request).await?;
    Ok(Json(response))
}

async fn recall_memory(
    State(state): State<AppState>,
    Json(request): Json<RecallRequest>,
) -> Result<Json<RecallResponse>, AppError> {
    let response = state.service.recall(request).await?;
    Ok(Json(response))
}

// ---- Router ----

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/memory/store", post(store_memory))
        .route("/memory/recall", post(recall_memory))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}
