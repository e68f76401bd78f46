use serde::{Deserialize, Deserializer, Serialize};

pub mod feedback;
pub mod genre;
pub mod recommendation;

pub use feedback::{decode_books, encode_books, Feedback, FeedbackFilter, FeedbackRow, NewFeedback};
pub use genre::{Genre, UnknownGenre};
pub use recommendation::{NewRecommendation, Recommendation};

/// Lowest confidence the predictor may report
pub const MIN_CONFIDENCE: i32 = 30;
/// Highest confidence the predictor may report
pub const MAX_CONFIDENCE: i32 = 79;
/// Number of recommended titles in every prediction
pub const RECOMMENDATION_COUNT: usize = 5;
/// Width of the `book_name` columns, in characters
pub const MAX_BOOK_NAME_LEN: usize = 255;
/// Width of the `predicted_genre` column, in characters
pub const MAX_GENRE_LEN: usize = 100;

/// Rejects `value` when it is wider than a `VARCHAR(max)` column
pub(crate) fn check_width(field: &str, value: &str, max: usize) -> crate::error::AppResult<()> {
    if value.chars().count() > max {
        return Err(crate::error::AppError::Validation(format!(
            "{} must be at most {} characters.",
            field, max
        )));
    }
    Ok(())
}

/// A validated genre prediction, carrying the user's original input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub book_name: String,
    pub book_description: String,
    pub genre: Genre,
    pub confidence: i32,
    pub recommended_books: Vec<String>,
}

/// Request to predict the genre of a book
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub book_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub book_description: String,
}

/// Reads a JSON `null` string field as `""`
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Aggregate view over a user's feedback
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedbackStats {
    pub total: usize,
    pub satisfied_count: usize,
    pub satisfied_percentage: f64,
    pub dissatisfied_count: usize,
    pub dissatisfied_percentage: f64,
    pub recommend_count: usize,
    pub recommend_percentage: f64,
    pub average_confidence: f64,
    /// Rows per predicted genre, ordered by genre name
    pub genre_breakdown: Vec<GenreCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_request_defaults_missing_fields() {
        let request: PredictionRequest =
            serde_json::from_str(r#"{"book_name": "Dune"}"#).unwrap();
        assert_eq!(request.book_name, "Dune");
        assert_eq!(request.book_description, "");
    }

    #[test]
    fn test_prediction_request_null_fields_are_empty() {
        let request: PredictionRequest =
            serde_json::from_str(r#"{"book_name": null, "book_description": "Spice"}"#).unwrap();
        assert_eq!(request.book_name, "");
        assert_eq!(request.book_description, "Spice");

        assert!(serde_json::from_str::<PredictionRequest>(r#"{"book_name": 42}"#).is_err());
    }

    #[test]
    fn test_prediction_serialization() {
        let prediction = Prediction {
            book_name: "Dune".to_string(),
            book_description: "Spice".to_string(),
            genre: Genre::Science,
            confidence: 61,
            recommended_books: vec!["Foundation".to_string()],
        };
        let json = serde_json::to_value(&prediction).unwrap();
        assert_eq!(json["genre"], "science");
        assert_eq!(json["confidence"], 61);
    }
}
