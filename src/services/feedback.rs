use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{Feedback, NewFeedback},
};

/// Body of a feedback submission
///
/// Every field is optional. Missing text becomes `""`, a missing confidence
/// becomes 0 and missing reactions stay pending (`None`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedbackSubmission {
    pub book_name: Option<String>,
    pub book_description: Option<String>,
    pub genre: Option<String>,
    pub confidence: Option<i32>,
    pub recommended_books: Option<Vec<String>>,
    pub satisfied: Option<bool>,
    pub recommend: Option<bool>,
}

impl FeedbackSubmission {
    /// Parses a raw JSON body
    pub fn from_json(body: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(body)
            .map_err(|e| AppError::Validation(format!("Invalid feedback body: {}", e)))
    }

    pub fn into_new_feedback(self, user_id: Option<Uuid>) -> NewFeedback {
        NewFeedback {
            user_id,
            book_name: self.book_name.unwrap_or_default(),
            book_description: self.book_description.unwrap_or_default(),
            predicted_genre: self.genre.unwrap_or_default(),
            // stored as sent; only the predictor enforces the 30..=79 range
            confidence: self.confidence.unwrap_or(0),
            recommended_books: self.recommended_books.unwrap_or_default(),
            user_satisfied: self.satisfied,
            user_recommend: self.recommend,
        }
    }
}

/// Persists one prediction together with the caller's reaction
///
/// Repeated submissions create repeated rows.
pub async fn record_feedback(
    store: &dyn Store,
    user_id: Option<Uuid>,
    submission: FeedbackSubmission,
) -> AppResult<Feedback> {
    let feedback = store
        .insert_feedback(submission.into_new_feedback(user_id))
        .await?;

    tracing::info!(
        feedback_id = %feedback.id,
        anonymous = user_id.is_none(),
        genre = %feedback.predicted_genre,
        store = store.name(),
        "Feedback saved"
    );

    Ok(feedback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::FeedbackFilter;

    #[test]
    fn test_missing_fields_take_defaults() {
        let submission = FeedbackSubmission::from_json(br#"{"book_name": "Dune"}"#).unwrap();
        let new = submission.into_new_feedback(None);

        assert_eq!(new.book_name, "Dune");
        assert_eq!(new.book_description, "");
        assert_eq!(new.predicted_genre, "");
        assert_eq!(new.confidence, 0);
        assert!(new.recommended_books.is_empty());
        assert_eq!(new.user_satisfied, None);
        assert_eq!(new.user_recommend, None);
    }

    #[test]
    fn test_null_reactions_are_pending() {
        let submission = FeedbackSubmission::from_json(
            br#"{"genre": "crime", "satisfied": null, "recommend": false, "book_name": null}"#,
        )
        .unwrap();
        let new = submission.into_new_feedback(None);

        assert_eq!(new.user_satisfied, None);
        assert_eq!(new.user_recommend, Some(false));
        assert_eq!(new.book_name, "");
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        assert!(matches!(
            FeedbackSubmission::from_json(b"not json"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            FeedbackSubmission::from_json(br#"{"confidence": "high"}"#),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_record_feedback_out_of_range_confidence_is_stored_verbatim() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let submission = FeedbackSubmission {
            genre: Some("fantasy".to_string()),
            confidence: Some(95),
            recommended_books: Some(vec!["A".to_string(), "B".to_string()]),
            satisfied: Some(true),
            ..Default::default()
        };

        let saved = record_feedback(&store, Some(user), submission).await.unwrap();
        assert_eq!(saved.confidence, 95);

        let rows = store.list_feedback(user, &FeedbackFilter::default()).await.unwrap();
        assert_eq!(rows, vec![saved]);
    }

    #[tokio::test]
    async fn test_repeated_submission_creates_duplicates() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let submission = FeedbackSubmission {
            book_name: Some("Dune".to_string()),
            ..Default::default()
        };

        record_feedback(&store, Some(user), submission.clone()).await.unwrap();
        record_feedback(&store, Some(user), submission).await.unwrap();

        assert_eq!(store.feedback_len().await, 2);
    }
}
