use axum::{Extension, Json};
use serde::Serialize;

use crate::{error::AppResult, middleware::Caller, services::suggestions};

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<&'static str>,
}

/// Handler for landing-page reading suggestions
pub async fn suggest(
    Extension(caller): Extension<Caller>,
) -> AppResult<Json<SuggestionsResponse>> {
    caller.require()?;
    Ok(Json(SuggestionsResponse {
        suggestions: suggestions::suggestions(),
    }))
}
