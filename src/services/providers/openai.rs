//! OpenAI chat-completions provider
//!
//! Sends `POST {api_url}/chat/completions` with deterministic sampling and no
//! token cap, and returns `choices[0].message.content`.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    error::PredictorError,
    services::providers::{ChatMessage, TextGenerator},
};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiGenerator {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
    timeout: Duration,
}

impl OpenAiGenerator {
    pub fn new(
        api_key: String,
        api_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, PredictorError> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_url)
    }

    fn extract_content(response: ChatCompletionResponse) -> Result<String, PredictorError> {
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(PredictorError::EmptyReply)
    }

    /// Error for a non-success reply; an unreadable body is reported in its place
    fn upstream_status(status: u16, body: Result<String, reqwest::Error>) -> PredictorError {
        let body = match body {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(status, error = %e, provider = "openai", "Failed to read error body");
                format!("<unreadable body: {}>", e)
            }
        };
        PredictorError::UpstreamStatus { status, body }
    }

    fn classify(&self, error: reqwest::Error) -> PredictorError {
        if error.is_timeout() {
            PredictorError::Timeout(self.timeout)
        } else {
            PredictorError::Transport(error)
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, PredictorError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            temperature: 0.0,
            messages,
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(Self::upstream_status(status, response.text().await));
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(|e| self.classify(e))?;
        let content = Self::extract_content(completion)?;

        tracing::debug!(
            model = %self.model,
            reply_len = content.len(),
            provider = "openai",
            "Chat completion received"
        );

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
