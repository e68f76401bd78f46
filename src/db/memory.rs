use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::Store,
    error::AppResult,
    models::{Feedback, FeedbackFilter, FeedbackRow, NewFeedback, NewRecommendation, Recommendation},
};

/// In-process store used by tests and when no database is configured
///
/// Feedback is held in its storage shape so the book list goes through the
/// same codec as the PostgreSQL column.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    feedback: Vec<FeedbackRow>,
    recommendations: Vec<Recommendation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of feedback rows across all users
    pub async fn feedback_len(&self) -> usize {
        self.inner.read().await.feedback.len()
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn insert_feedback(&self, feedback: NewFeedback) -> AppResult<Feedback> {
        feedback.check_column_limits()?;
        let row = FeedbackRow::from_new(feedback, Uuid::new_v4(), Utc::now());
        let stored = Feedback::try_from(row.clone())?;
        self.inner.write().await.feedback.push(row);
        Ok(stored)
    }

    async fn list_feedback(
        &self,
        user_id: Uuid,
        filter: &FeedbackFilter,
    ) -> AppResult<Vec<Feedback>> {
        let inner = self.inner.read().await;

        let mut rows = Vec::new();
        // newest insertion first, so equal timestamps keep reverse insertion order
        for row in inner.feedback.iter().rev() {
            if row.user_id != Some(user_id) {
                continue;
            }
            let feedback = Feedback::try_from(row.clone())?;
            if filter.matches(&feedback) {
                rows.push(feedback);
            }
        }
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(rows)
    }

    async fn insert_recommendation(
        &self,
        recommendation: NewRecommendation,
    ) -> AppResult<Recommendation> {
        recommendation.check_column_limits()?;
        let row = Recommendation::from_new(recommendation, Uuid::new_v4(), Utc::now());
        self.inner.write().await.recommendations.push(row.clone());
        Ok(row)
    }

    async fn list_recommendations(&self, user_id: Uuid) -> AppResult<Vec<Recommendation>> {
        let inner = self.inner.read().await;
        let mut rows: Vec<Recommendation> = inner
            .recommendations
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
