use super::types::{SearchRecord, SearchResponse};

/// Hard cap on records kept per query, also sent as `max_results`.
pub const MAX_RESULTS: u8 = 5;
/// Record content is clipped to this many characters before prompting.
pub const CONTENT_CHAR_LIMIT: usize = 500;

pub fn normalize_results(response: SearchResponse) -> Vec<SearchRecord> {
    response
        .results
        .unwrap_or_default()
        .into_iter()
        .filter_map(|result| {
            let url = result.url.filter(|u| !u.is_empty())?;
            let content = result.content.unwrap_or_default();
            Some(SearchRecord {
                title: result.title.unwrap_or_default(),
                url,
                content: truncate_chars(&content, CONTENT_CHAR_LIMIT).to_string(),
            })
        })
        .take(MAX_RESULTS as usize)
        .collect()
}

/// Clips to the first `max` characters without splitting a code point.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
