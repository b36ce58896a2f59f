use std::env;

use reqwest::Client;
use tracing::{debug, warn};

use super::normalize::{MAX_RESULTS, normalize_results};
use super::types::{SearchRecord, SearchRequest, SearchResponse};

const API_BASE: &str = "https://api.tavily.com";
const SEARCH_DEPTH: &str = "basic";

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("TAVILY_API_KEY not set. Get one at https://app.tavily.com")]
    ApiKeyNotSet,

    #[error("Tavily API key rejected: {0}")]
    InvalidApiKey(String),

    #[error("Tavily API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("Tavily API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Abstraction for web search returning normalized records.
/// Implemented by `TavilyClient` for production; mock implementations used in tests.
pub trait SearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchRecord>, SearchError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Clone)]
pub struct TavilyClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
}

impl TavilyClient {
    pub fn from_env(http: Client) -> Result<Self, SearchError> {
        let api_key = env::var("TAVILY_API_KEY").map_err(|_| SearchError::ApiKeyNotSet)?;
        if api_key.trim().is_empty() {
            return Err(SearchError::ApiKeyNotSet);
        }
        Ok(Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            base_url: API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            base_url: base_url.to_string(),
        }
    }
}

impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchRecord>, SearchError> {
        let url = format!("{}/search", self.base_url);

        let request = SearchRequest {
            query: query.to_string(),
            search_depth: SEARCH_DEPTH.to_string(),
            max_results: MAX_RESULTS,
            include_answer: false,
            include_raw_content: false,
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
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Tavily API rate limited");
            return Err(SearchError::RateLimited);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            let text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&text);
            warn!(status = %status, "Tavily API rejected the key");
            return Err(SearchError::InvalidApiKey(message));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Tavily API error");
            return Err(SearchError::Api {
                code: status.as_u16(),
                message: extract_error_message(&text),
            });
        }

        let body: SearchResponse = response.json().await?;
        let records = normalize_results(body);
        debug!(records = records.len(), "tavily search complete");

        Ok(records)
    }
}

/// Tavily error bodies are either `{"detail": {"error": "..."}}` or a
/// flat `{"detail": "..."}`; fall back to a raw body snippet.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v["detail"]["error"]
                .as_str()
                .or_else(|| v["detail"].as_str())
                .or_else(|| v["error"].as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
