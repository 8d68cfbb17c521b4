//! Chat-completion gateway.
//!
//! One request, two messages (system + user), first choice's text back.
//! No retries, no streaming, no multi-turn state.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM API request failed with status {status}")]
    Api { status: reqwest::StatusCode },

    #[error("LLM API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM reply contained no choices")]
    EmptyResponse,
}

/// The one operation the analysis stages need from a model. Implemented by
/// LlmClient for real use and by scripted fakes in tests.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;
}

/// OpenAI-compatible chat-completion client.
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl ChatCompleter for LlmClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        #[derive(serde::Deserialize)]
        struct Message {
            content: String,
        }

        #[derive(serde::Deserialize)]
        struct Choice {
            message: Message,
        }

        #[derive(serde::Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
        });

        debug!(model = %self.model, user_prompt_bytes = user_prompt.len(), "sending chat completion request");
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        // The raw API error body is not surfaced; callers get the status.
        if !response.status().is_success() {
            return Err(LlmError::Api {
                status: response.status(),
            });
        }

        let reply = response.json::<ChatResponse>().await?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)?;
        debug!(reply_bytes = content.len(), "received chat completion reply");

        Ok(content)
    }
}
