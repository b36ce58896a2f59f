use std::env;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::types::{ChatMessage, ChatRequest, ChatResponse};

const API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Greedy decoding; the same prompt must draft the same answer.
const TEMPERATURE: f32 = 0.0;
/// Upper bound for one completion round-trip; overrides the shared client timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("OPENAI_API_KEY not set. Get one at https://platform.openai.com/api-keys")]
    ApiKeyNotSet,

    #[error("OpenAI API key rejected: {0}")]
    InvalidApiKey(String),

    #[error("OpenAI API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("OpenAI API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Abstraction for drafting an answer from a rendered prompt.
/// Implemented by `OpenAiClient` for production; mock implementations used in tests.
pub trait CompletionProvider {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: ApiKey,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn from_env(http: Client) -> Result<Self, CompletionError> {
        let api_key = env::var("OPENAI_API_KEY").map_err(|_| CompletionError::ApiKeyNotSet)?;
        if api_key.trim().is_empty() {
            return Err(CompletionError::ApiKeyNotSet);
        }
        let model = env::var("OPENAI_MODEL")
            .ok()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            model,
            base_url: API_BASE.to_string(),
        })
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.to_string(),
        }
    }
}

impl CompletionProvider for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: TEMPERATURE,
        };

        debug_assert!(
            url.starts_with("https://") || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("OpenAI API rate limited");
            return Err(CompletionError::RateLimited);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            let text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&text);
            warn!("OpenAI API rejected the key");
            return Err(CompletionError::InvalidApiKey(message));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "OpenAI API error");
            return Err(CompletionError::Api {
                code: status.as_u16(),
                message: extract_error_message(&text),
            });
        }

        let body: ChatResponse = response.json().await?;
        debug!(model = %self.model, "completion received");

        extract_answer(body)
    }
}

/// OpenAI error bodies nest the message under `error`.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

fn extract_answer(response: ChatResponse) -> Result<String, CompletionError> {
    if let Some(err) = response.error {
        return Err(CompletionError::Api {
            code: 0,
            message: err
                .message
                .unwrap_or_else(|| "Unknown error (no message)".to_string()),
        });
    }

    let answer = response
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| {
            CompletionError::MalformedResponse("no message content in choices".to_string())
        })?;

    if answer.is_empty() {
        warn!("model returned an empty answer");
    }

    Ok(answer)
}
