use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::Store,
    middleware::{caller_identity_middleware, make_span_with_request_id, request_id_middleware},
    services::GenrePredictor,
};

pub mod feedback;
pub mod predict;
pub mod recommendations;
pub mod suggestions;

/// Shared application state, built once at start-up
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub predictor: GenrePredictor,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, predictor: GenrePredictor) -> Self {
        Self { store, predictor }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(from_fn(caller_identity_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/suggestions", get(suggestions::suggest))
        .route("/predict", post(predict::predict))
        .route(
            "/feedback",
            post(feedback::save_feedback).get(feedback::history),
        )
        .route("/feedback/stats", get(feedback::stats))
        .route(
            "/recommendations",
            post(recommendations::create).get(recommendations::list),
        )
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "predictor": state.predictor.is_available(),
            "store": state.store.name(),
        })),
    )
}
