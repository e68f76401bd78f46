use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures of the text-generation round trip
#[derive(thiserror::Error, Debug)]
pub enum PredictorError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("endpoint returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("endpoint returned no message content")]
    EmptyReply,

    #[error("reply is not valid JSON ({source}): {raw}")]
    MalformedJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("reply rejected ({reason}): {raw}")]
    InvalidReply { raw: String, reason: String },
}

impl PredictorError {
    /// Raw model output, when the failure happened after a reply arrived
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            PredictorError::MalformedJson { raw, .. } | PredictorError::InvalidReply { raw, .. } => {
                Some(raw.as_str())
            }
            _ => None,
        }
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Error predicting genre: {0}")]
    Predictor(#[from] PredictorError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Predictor(PredictorError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Predictor(_) => StatusCode::BAD_GATEWAY,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
