use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    db::Store,
    error::AppResult,
    models::{
        encode_books, Feedback, FeedbackFilter, FeedbackRow, NewFeedback, NewRecommendation,
        Recommendation,
    },
};

/// Creates a PostgreSQL connection pool and applies pending migrations
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Store backed by the `book_feedback` and `user_recommendations` tables
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn insert_feedback(&self, feedback: NewFeedback) -> AppResult<Feedback> {
        feedback.check_column_limits()?;
        let row = sqlx::query_as::<_, FeedbackRow>(
            r#"
            INSERT INTO book_feedback (
                id, user_id, book_name, book_description, predicted_genre,
                confidence, recommended_books, user_satisfied, user_recommend
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, book_name, book_description, predicted_genre,
                      confidence, recommended_books, user_satisfied, user_recommend, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(feedback.user_id)
        .bind(&feedback.book_name)
        .bind(&feedback.book_description)
        .bind(&feedback.predicted_genre)
        .bind(feedback.confidence)
        .bind(encode_books(&feedback.recommended_books))
        .bind(feedback.user_satisfied)
        .bind(feedback.user_recommend)
        .fetch_one(&self.pool)
        .await?;

        Feedback::try_from(row)
    }

    async fn list_feedback(
        &self,
        user_id: Uuid,
        filter: &FeedbackFilter,
    ) -> AppResult<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(
            r#"
            SELECT id, user_id, book_name, book_description, predicted_genre,
                   confidence, recommended_books, user_satisfied, user_recommend, created_at
            FROM book_feedback
            WHERE user_id = $1
              AND ($2::text IS NULL OR lower(predicted_genre) = lower($2))
              AND ($3::boolean IS NULL OR user_satisfied = $3)
              AND ($4::boolean IS NULL OR user_recommend = $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.genre.as_deref())
        .bind(filter.satisfied)
        .bind(filter.recommend)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Feedback::try_from).collect()
    }

    async fn insert_recommendation(
        &self,
        recommendation: NewRecommendation,
    ) -> AppResult<Recommendation> {
        recommendation.check_column_limits()?;
        let row = sqlx::query_as::<_, Recommendation>(
            r#"
            INSERT INTO user_recommendations (id, user_id, book_name, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, book_name, comment, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(recommendation.user_id)
        .bind(&recommendation.book_name)
        .bind(&recommendation.comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_recommendations(&self, user_id: Uuid) -> AppResult<Vec<Recommendation>> {
        let rows = sqlx::query_as::<_, Recommendation>(
            r#"
            SELECT id, user_id, book_name, comment, created_at
            FROM user_recommendations
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
