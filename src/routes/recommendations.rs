use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult, middleware::Caller, models::Recommendation, routes::AppState,
    services::recommendations,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecommendationRequest {
    pub book_name: String,
    pub comment: String,
}

/// Handler for posting a recommendation
pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<(StatusCode, Json<Recommendation>)> {
    let user_id = caller.require()?;
    let recommendation = recommendations::add_recommendation(
        state.store.as_ref(),
        user_id,
        &request.book_name,
        &request.comment,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(recommendation)))
}

/// Handler listing the caller's recommendations, newest first
pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let user_id = caller.require()?;
    let rows = recommendations::my_recommendations(state.store.as_ref(), user_id).await?;
    Ok(Json(rows))
}
