use std::{collections::HashSet, sync::Arc, time::Duration, time::Instant};

use serde_json::Value;

use crate::{
    error::{AppError, AppResult, PredictorError},
    models::{Genre, Prediction, MAX_CONFIDENCE, MIN_CONFIDENCE, RECOMMENDATION_COUNT},
    services::providers::{ChatMessage, TextGenerator},
};

/// Predicts a book's genre through a text generator
///
/// Built once at start-up. Without a generator every prediction fails with a
/// configuration error and no network call is attempted.
#[derive(Clone)]
pub struct GenrePredictor {
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

/// A reply that passed validation, before the user input is attached
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub genre: Genre,
    pub confidence: i32,
    pub recommended_books: Vec<String>,
}

impl GenrePredictor {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            generator: Some(generator),
            timeout,
        }
    }

    /// A predictor with no credential configured
    pub fn unavailable() -> Self {
        Self {
            generator: None,
            timeout: Duration::ZERO,
        }
    }

    pub fn is_available(&self) -> bool {
        self.generator.is_some()
    }

    /// Predicts the genre and five recommendations for a book
    ///
    /// Makes exactly one generator call, bounded by the configured timeout.
    pub async fn predict(&self, book_name: &str, book_description: &str) -> AppResult<Prediction> {
        if book_name.trim().is_empty() || book_description.trim().is_empty() {
            return Err(AppError::Validation(
                "Please provide both book name and description.".to_string(),
            ));
        }

        let generator = self.generator.as_ref().ok_or_else(|| {
            AppError::Configuration(
                "OpenAI API is not configured. Please set OPENAI_API_KEY.".to_string(),
            )
        })?;

        let messages = build_messages(book_name, book_description);
        let start = Instant::now();

        let raw = tokio::time::timeout(self.timeout, generator.generate(&messages))
            .await
            .map_err(|_| PredictorError::Timeout(self.timeout))?
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    provider = generator.name(),
                    "Text generation failed"
                );
                e
            })?;

        let reply = parse_reply(&raw).map_err(|e| {
            tracing::warn!(
                error = %e,
                raw = e.raw_reply().unwrap_or_default(),
                provider = generator.name(),
                "Rejected model reply"
            );
            e
        })?;

        tracing::info!(
            genre = %reply.genre,
            confidence = reply.confidence,
            elapsed_ms = start.elapsed().as_millis(),
            provider = generator.name(),
            "Genre predicted"
        );

        Ok(Prediction {
            book_name: book_name.to_string(),
            book_description: book_description.to_string(),
            genre: reply.genre,
            confidence: reply.confidence,
            recommended_books: reply.recommended_books,
        })
    }
}

/// System and user messages for one prediction; the inputs are embedded verbatim
pub fn build_messages(book_name: &str, book_description: &str) -> Vec<ChatMessage> {
    let genres = Genre::ALL
        .iter()
        .map(Genre::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let system = format!(
        "You are a helpful assistant that predicts the genre of a book from its name and description. \
         Choose exactly one genre from this list: {genres}. \
         Give a confidence score between {min} and {max}. \
         Then recommend {count} famous books from that genre.\n\n\
         Respond ONLY with JSON in this format:\n\
         {{\n  \"genre\": \"chosen_genre\",\n  \"confidence\": number,\n  \
         \"recommended_books\": [\"book1\", \"book2\", \"book3\", \"book4\", \"book5\"]\n}}\n\
         Do not add any explanation, only output valid JSON.",
        genres = genres,
        min = MIN_CONFIDENCE,
        max = MAX_CONFIDENCE,
        count = RECOMMENDATION_COUNT,
    );

    let user = format!(
        "Book Name: {}\nDescription: {}",
        book_name, book_description
    );

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Removes Markdown code fences and surrounding whitespace
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parses and validates a model reply
pub fn parse_reply(raw: &str) -> Result<ParsedReply, PredictorError> {
    let cleaned = strip_code_fences(raw);
    let value: Value =
        serde_json::from_str(&cleaned).map_err(|source| PredictorError::MalformedJson {
            raw: raw.to_string(),
            source,
        })?;

    let invalid = |reason: String| PredictorError::InvalidReply {
        raw: raw.to_string(),
        reason,
    };

    let object = value
        .as_object()
        .ok_or_else(|| invalid("reply is not a JSON object".to_string()))?;

    let genre = object
        .get("genre")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing or non-string \"genre\"".to_string()))?
        .parse::<Genre>()
        .map_err(|e| invalid(e.to_string()))?;

    let confidence = object
        .get("confidence")
        .and_then(Value::as_i64)
        .ok_or_else(|| invalid("missing or non-integer \"confidence\"".to_string()))?;
    if !(MIN_CONFIDENCE as i64..=MAX_CONFIDENCE as i64).contains(&confidence) {
        return Err(invalid(format!(
            "confidence {} outside {}..={}",
            confidence, MIN_CONFIDENCE, MAX_CONFIDENCE
        )));
    }

    let books = object
        .get("recommended_books")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("missing or non-array \"recommended_books\"".to_string()))?;
    if books.len() != RECOMMENDATION_COUNT {
        return Err(invalid(format!(
            "expected {} recommended books, got {}",
            RECOMMENDATION_COUNT,
            books.len()
        )));
    }

    let mut seen = HashSet::new();
    let mut recommended_books = Vec::with_capacity(RECOMMENDATION_COUNT);
    for book in books {
        let title = book
            .as_str()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .ok_or_else(|| invalid("recommended books must be non-empty strings".to_string()))?;
        if !seen.insert(title.to_lowercase()) {
            return Err(invalid(format!("duplicate recommended book \"{}\"", title)));
        }
        recommended_books.push(title.to_string());
    }

    Ok(ParsedReply {
        genre,
        // range-checked above
        confidence: confidence as i32,
        recommended_books,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::{MockTextGenerator, Role};

    const FANTASY_REPLY: &str =
        r#"{"genre":"fantasy","confidence":65,"recommended_books":["A","B","C","D","E"]}"#;

    fn predictor_with(mock: MockTextGenerator) -> GenrePredictor {
        GenrePredictor::new(Arc::new(mock), Duration::from_secs(5))
    }

    fn mock_replying(reply: &'static str) -> MockTextGenerator {
        let mut mock = MockTextGenerator::new();
        mock.expect_name().return_const("mock");
        mock.expect_generate()
            .times(1)
            .returning(move |_| Ok(reply.to_string()));
        mock
    }

    #[test]
    fn test_strip_code_fences() {
        let fenced = format!("```json\n{}\n```", FANTASY_REPLY);
        assert_eq!(strip_code_fences(&fenced), FANTASY_REPLY);
        assert_eq!(strip_code_fences(&format!("```{}```", FANTASY_REPLY)), FANTASY_REPLY);
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }

    #[test]
    fn test_parse_fenced_reply_equals_unwrapped() {
        let fenced = format!("```json\n{}\n```", FANTASY_REPLY);
        let from_fenced = parse_reply(&fenced).unwrap();
        let from_plain = parse_reply(FANTASY_REPLY).unwrap();

        assert_eq!(from_fenced, from_plain);
        assert_eq!(
            from_fenced,
            ParsedReply {
                genre: Genre::Fantasy,
                confidence: 65,
                recommended_books: vec!["A", "B", "C", "D", "E"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            }
        );
    }

    #[test]
    fn test_parse_malformed_json_keeps_raw_text() {
        let err = parse_reply("The genre is fantasy").unwrap_err();
        match err {
            PredictorError::MalformedJson { raw, .. } => assert_eq!(raw, "The genre is fantasy"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let err = parse_reply(r#"{"confidence":50,"recommended_books":["A","B","C","D","E"]}"#)
            .unwrap_err();
        assert!(matches!(err, PredictorError::InvalidReply { .. }));

        let err = parse_reply(r#"{"genre":"crime","recommended_books":["A","B","C","D","E"]}"#)
            .unwrap_err();
        assert!(matches!(err, PredictorError::InvalidReply { .. }));

        let err = parse_reply(r#"{"genre":"crime","confidence":50}"#).unwrap_err();
        assert!(matches!(err, PredictorError::InvalidReply { .. }));

        assert!(parse_reply("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_genre() {
        let err = parse_reply(
            r#"{"genre":"cooking","confidence":50,"recommended_books":["A","B","C","D","E"]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown genre"));
    }

    #[test]
    fn test_parse_confidence_bounds() {
        let reply = |confidence: i64| {
            format!(
                r#"{{"genre":"crime","confidence":{},"recommended_books":["A","B","C","D","E"]}}"#,
                confidence
            )
        };

        assert_eq!(parse_reply(&reply(30)).unwrap().confidence, 30);
        assert_eq!(parse_reply(&reply(79)).unwrap().confidence, 79);
        assert!(parse_reply(&reply(29)).is_err());
        assert!(parse_reply(&reply(80)).is_err());
        assert!(parse_reply(
            r#"{"genre":"crime","confidence":"high","recommended_books":["A","B","C","D","E"]}"#
        )
        .is_err());
    }

    #[test]
    fn test_parse_book_list_rules() {
        let four = r#"{"genre":"crime","confidence":50,"recommended_books":["A","B","C","D"]}"#;
        assert!(parse_reply(four).is_err());

        let dup = r#"{"genre":"crime","confidence":50,"recommended_books":["A","B","C","D","a"]}"#;
        assert!(parse_reply(dup).unwrap_err().to_string().contains("duplicate"));

        let blank = r#"{"genre":"crime","confidence":50,"recommended_books":["A","B","C","D"," "]}"#;
        assert!(parse_reply(blank).is_err());
    }

    #[test]
    fn test_parse_accepts_capitalized_genre() {
        let reply = parse_reply(
            r#"{"genre":"Thriller","confidence":70,"recommended_books":["A","B","C","D","E"]}"#,
        )
        .unwrap();
        assert_eq!(reply.genre, Genre::Thriller);
    }

    #[test]
    fn test_build_messages_embeds_input_verbatim() {
        let messages = build_messages("  The Hobbit", "A \"small\" adventure\nwith dragons");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        for genre in Genre::ALL {
            assert!(messages[0].content.contains(genre.as_str()));
        }
        assert!(messages[0].content.contains("between 30 and 79"));
        assert!(messages[0].content.contains("only output valid JSON"));
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(
            messages[1].content,
            "Book Name:   The Hobbit\nDescription: A \"small\" adventure\nwith dragons"
        );
    }

    #[tokio::test]
    async fn test_predict_success_attaches_input() {
        let predictor = predictor_with(mock_replying(
            "```json\n{\"genre\":\"fantasy\",\"confidence\":65,\"recommended_books\":[\"A\",\"B\",\"C\",\"D\",\"E\"]}\n```",
        ));

        let prediction = predictor
            .predict("The Hobbit", "A hobbit and a dragon")
            .await
            .unwrap();

        assert_eq!(prediction.book_name, "The Hobbit");
        assert_eq!(prediction.book_description, "A hobbit and a dragon");
        assert_eq!(prediction.genre, Genre::Fantasy);
        assert_eq!(prediction.confidence, 65);
        assert_eq!(prediction.recommended_books.len(), 5);
    }

    #[tokio::test]
    async fn test_predict_empty_input_makes_no_call() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().never();
        let predictor = predictor_with(mock);

        let err = predictor.predict("", "description").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = predictor.predict("The Hobbit", "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_predict_unavailable_is_configuration_error() {
        let predictor = GenrePredictor::unavailable();
        assert!(!predictor.is_available());

        let err = predictor.predict("The Hobbit", "Dragons").await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));

        // validation still comes first
        let err = predictor.predict("", "Dragons").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_predict_transport_failure_is_predictor_error() {
        let mut mock = MockTextGenerator::new();
        mock.expect_name().return_const("mock");
        mock.expect_generate()
            .times(1)
            .returning(|_| Err(PredictorError::EmptyReply));
        let predictor = predictor_with(mock);

        let err = predictor.predict("Dune", "Spice").await.unwrap_err();
        assert!(matches!(err, AppError::Predictor(PredictorError::EmptyReply)));
    }

    #[tokio::test]
    async fn test_predict_invalid_reply_is_predictor_error() {
        let predictor = predictor_with(mock_replying("Sorry, I cannot help with that."));

        let err = predictor.predict("Dune", "Spice").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Predictor(PredictorError::MalformedJson { .. })
        ));
    }

    struct SlowGenerator;

    #[async_trait::async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate(&self, _messages: &[ChatMessage]) -> Result<String, PredictorError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(FANTASY_REPLY.to_string())
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_predict_times_out() {
        let predictor = GenrePredictor::new(Arc::new(SlowGenerator), Duration::from_millis(20));

        let err = predictor.predict("Dune", "Spice").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Predictor(PredictorError::Timeout(_))
        ));
    }
}
