use uuid::Uuid;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{NewRecommendation, Recommendation},
};

/// Stores a user's free-text endorsement of a book
///
/// Both fields must be non-blank; nothing is written otherwise.
pub async fn add_recommendation(
    store: &dyn Store,
    user_id: Uuid,
    book_name: &str,
    comment: &str,
) -> AppResult<Recommendation> {
    if book_name.trim().is_empty() || comment.trim().is_empty() {
        return Err(AppError::Validation(
            "Please provide both book name and comment.".to_string(),
        ));
    }

    let recommendation = store
        .insert_recommendation(NewRecommendation {
            user_id,
            book_name: book_name.to_string(),
            comment: comment.to_string(),
        })
        .await?;

    tracing::info!(
        recommendation_id = %recommendation.id,
        user_id = %user_id,
        "Recommendation added"
    );

    Ok(recommendation)
}

pub async fn my_recommendations(
    store: &dyn Store,
    user_id: Uuid,
) -> AppResult<Vec<Recommendation>> {
    store.list_recommendations(user_id).await
}
