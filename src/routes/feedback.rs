use axum::{
    body::Bytes,
    extract::{Query, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::{Caller, RequestId},
    models::{Feedback, FeedbackFilter, FeedbackStats},
    routes::AppState,
    services::{feedback, statistics, FeedbackSubmission},
};

/// Outcome payload of a feedback submission, always sent with 200 OK
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FeedbackStatus {
    Success,
    Error { message: String },
}

/// Handler for saving feedback; anonymous callers are allowed
pub async fn save_feedback(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Extension(caller): Extension<Caller>,
    body: Bytes,
) -> Json<FeedbackStatus> {
    let result = match FeedbackSubmission::from_json(&body) {
        Ok(submission) => {
            feedback::record_feedback(state.store.as_ref(), caller.user_id(), submission).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => Json(FeedbackStatus::Success),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Feedback not saved");
            Json(FeedbackStatus::Error {
                message: e.to_string(),
            })
        }
    }
}

/// Handler for the caller's feedback history, newest first
pub async fn history(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Query(filter): Query<FeedbackFilter>,
) -> AppResult<Json<Vec<Feedback>>> {
    let user_id = caller.require()?;
    let rows = state.store.list_feedback(user_id, &filter).await?;
    Ok(Json(rows))
}

/// Handler for the caller's feedback statistics
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> AppResult<Json<FeedbackStats>> {
    let user_id = caller.require()?;
    let rows = state
        .store
        .list_feedback(user_id, &FeedbackFilter::default())
        .await?;
    Ok(Json(statistics::compute(&rows)))
}
