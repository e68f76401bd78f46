//! Persistence abstraction
//!
//! Feedback and recommendation rows go through the `Store` trait so the HTTP
//! layer does not care whether PostgreSQL or the in-process store backs it.

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Feedback, FeedbackFilter, NewFeedback, NewRecommendation, Recommendation},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PgStore};

/// Append-only storage for feedback and recommendations
///
/// Rows are never updated or deleted. Listings are newest first.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Persists one feedback row, assigning its id and creation time
    async fn insert_feedback(&self, feedback: NewFeedback) -> AppResult<Feedback>;

    /// Feedback owned by `user_id` that passes `filter`
    async fn list_feedback(&self, user_id: Uuid, filter: &FeedbackFilter)
        -> AppResult<Vec<Feedback>>;

    async fn insert_recommendation(
        &self,
        recommendation: NewRecommendation,
    ) -> AppResult<Recommendation>;

    async fn list_recommendations(&self, user_id: Uuid) -> AppResult<Vec<Recommendation>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
