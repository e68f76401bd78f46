//! Text-generation provider abstraction
//!
//! The genre predictor talks to the language model only through
//! `TextGenerator`, so the client is built once at start-up and handed in,
//! and tests can script the replies.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PredictorError;

pub mod openai;

pub use openai::OpenAiGenerator;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Trait for text-generation endpoints
///
/// One call is one round trip: implementations must not retry on their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends the conversation and returns the raw text of the reply
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, PredictorError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
