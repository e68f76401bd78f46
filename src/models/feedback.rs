use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{check_width, MAX_BOOK_NAME_LEN, MAX_GENRE_LEN},
};

/// A stored prediction paired with the user's reaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub book_name: String,
    pub book_description: String,
    pub predicted_genre: String,
    pub confidence: i32,
    pub recommended_books: Vec<String>,
    pub user_satisfied: Option<bool>,
    pub user_recommend: Option<bool>,
    pub created_at: DateTime<Utc>,
}

/// Feedback as submitted, before the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub user_id: Option<Uuid>,
    pub book_name: String,
    pub book_description: String,
    pub predicted_genre: String,
    pub confidence: i32,
    pub recommended_books: Vec<String>,
    pub user_satisfied: Option<bool>,
    pub user_recommend: Option<bool>,
}

impl NewFeedback {
    /// Checks the widths both stores enforce on text columns
    pub fn check_column_limits(&self) -> AppResult<()> {
        check_width("Book name", &self.book_name, MAX_BOOK_NAME_LEN)?;
        check_width("Genre", &self.predicted_genre, MAX_GENRE_LEN)
    }
}

/// Storage shape of a feedback row; `recommended_books` holds the encoded list
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedbackRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub book_name: String,
    pub book_description: String,
    pub predicted_genre: String,
    pub confidence: i32,
    pub recommended_books: String,
    pub user_satisfied: Option<bool>,
    pub user_recommend: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRow {
    pub fn from_new(new: NewFeedback, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            book_name: new.book_name,
            book_description: new.book_description,
            predicted_genre: new.predicted_genre,
            confidence: new.confidence,
            recommended_books: encode_books(&new.recommended_books),
            user_satisfied: new.user_satisfied,
            user_recommend: new.user_recommend,
            created_at,
        }
    }
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = AppError;

    fn try_from(row: FeedbackRow) -> AppResult<Self> {
        Ok(Self {
            recommended_books: decode_books(&row.recommended_books)?,
            id: row.id,
            user_id: row.user_id,
            book_name: row.book_name,
            book_description: row.book_description,
            predicted_genre: row.predicted_genre,
            confidence: row.confidence,
            user_satisfied: row.user_satisfied,
            user_recommend: row.user_recommend,
            created_at: row.created_at,
        })
    }
}

/// Encodes a book list as a JSON array string
pub fn encode_books(books: &[String]) -> String {
    serde_json::Value::from(books.to_vec()).to_string()
}

/// Decodes a list written by [`encode_books`]
pub fn decode_books(encoded: &str) -> AppResult<Vec<String>> {
    serde_json::from_str(encoded)
        .map_err(|e| AppError::Internal(format!("Corrupt recommended_books column: {}", e)))
}

/// Optional narrowing of a user's feedback history
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FeedbackFilter {
    pub genre: Option<String>,
    pub satisfied: Option<bool>,
    pub recommend: Option<bool>,
}

impl FeedbackFilter {
    pub fn matches(&self, feedback: &Feedback) -> bool {
        self.genre
            .as_deref()
            .map_or(true, |g| feedback.predicted_genre.eq_ignore_ascii_case(g))
            && self
                .satisfied
                .map_or(true, |s| feedback.user_satisfied == Some(s))
            && self
                .recommend
                .map_or(true, |r| feedback.user_recommend == Some(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn books() -> Vec<String> {
        ["Dune", "Emma", "It", "Ulysses", "Beloved"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn sample_new() -> NewFeedback {
        NewFeedback {
            user_id: None,
            book_name: "The Hobbit".to_string(),
            book_description: "A hobbit goes on an adventure".to_string(),
            predicted_genre: "fantasy".to_string(),
            confidence: 72,
            recommended_books: books(),
            user_satisfied: Some(true),
            user_recommend: None,
        }
    }

    #[test]
    fn test_books_codec_preserves_order() {
        let encoded = encode_books(&books());
        assert_eq!(
            encoded,
            r#"["Dune","Emma","It","Ulysses","Beloved"]"#
        );
        assert_eq!(decode_books(&encoded).unwrap(), books());
    }

    #[test]
    fn test_books_codec_escapes_quotes() {
        let tricky = vec!["Say \"Hi\"".to_string(), "Thinking, Fast and Slow".to_string()];
        assert_eq!(decode_books(&encode_books(&tricky)).unwrap(), tricky);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_books("Dune, Emma"),
            Err(AppError::Internal(_))
        ));
    }

    #[test]
    fn test_row_conversion() {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let row = FeedbackRow::from_new(sample_new(), id, now);
        let feedback = Feedback::try_from(row).unwrap();

        assert_eq!(feedback.id, id);
        assert_eq!(feedback.created_at, now);
        assert_eq!(feedback.recommended_books, books());
        assert_eq!(feedback.user_satisfied, Some(true));
        assert_eq!(feedback.user_recommend, None);
    }

    #[test]
    fn test_filter_matches() {
        let feedback =
            Feedback::try_from(FeedbackRow::from_new(sample_new(), Uuid::new_v4(), Utc::now()))
                .unwrap();

        assert!(FeedbackFilter::default().matches(&feedback));
        assert!(FeedbackFilter {
            genre: Some("Fantasy".to_string()),
            satisfied: Some(true),
            recommend: None,
        }
        .matches(&feedback));
        assert!(!FeedbackFilter {
            satisfied: Some(false),
            ..Default::default()
        }
        .matches(&feedback));
        // a pending reaction matches neither true nor false
        assert!(!FeedbackFilter {
            recommend: Some(false),
            ..Default::default()
        }
        .matches(&feedback));
    }
}
