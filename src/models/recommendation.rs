use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{check_width, MAX_BOOK_NAME_LEN},
};

/// A free-text book endorsement written by a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Recommendation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_name: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecommendation {
    pub user_id: Uuid,
    pub book_name: String,
    pub comment: String,
}

impl NewRecommendation {
    pub fn check_column_limits(&self) -> AppResult<()> {
        check_width("Book name", &self.book_name, MAX_BOOK_NAME_LEN)
    }
}

impl Recommendation {
    pub fn from_new(new: NewRecommendation, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            book_name: new.book_name,
            comment: new.comment,
            created_at,
        }
    }
}
