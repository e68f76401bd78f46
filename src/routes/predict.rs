use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::{
    error::AppError,
    middleware::{Caller, RequestId},
    models::{Prediction, PredictionRequest},
    routes::AppState,
};

/// A failed prediction, echoing the input so the client can re-display it
#[derive(Debug)]
pub struct PredictFailure {
    pub error: AppError,
    pub request: PredictionRequest,
}

impl IntoResponse for PredictFailure {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = Json(json!({
            "error": self.error.to_string(),
            "book_name": self.request.book_name,
            "book_description": self.request.book_description,
        }));

        (status, body).into_response()
    }
}

/// Handler for genre prediction
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<Prediction>, PredictFailure> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(request_id = %request_id, error = %rejection, "Unreadable prediction body");
            PredictionRequest::default()
        }
    };

    if let Err(error) = caller.require() {
        return Err(PredictFailure { error, request });
    }

    tracing::info!(
        request_id = %request_id,
        book_name = %request.book_name,
        "Processing prediction request"
    );

    match state
        .predictor
        .predict(&request.book_name, &request.book_description)
        .await
    {
        Ok(prediction) => Ok(Json(prediction)),
        Err(error) => {
            tracing::warn!(request_id = %request_id, error = %error, "Prediction failed");
            Err(PredictFailure { error, request })
        }
    }
}
