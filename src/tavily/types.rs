use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub search_depth: String,
    pub max_results: u8,
    pub include_answer: bool,
    pub include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub title: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
}

/// One normalized search hit, ready for prompt rendering.
#[derive(Debug, Clone)]
pub struct SearchRecord {
    pub title: String,
    pub url: String,
    pub content: String,
}
