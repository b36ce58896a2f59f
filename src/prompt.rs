//! Prompt rendering for the answer-drafting step.

use crate::tavily::SearchRecord;

/// Renders the fixed drafting prompt around the query and research block.
pub fn render(query: &str, records: &[SearchRecord]) -> String {
    format!(
        "You are an expert at drafting concise and accurate answers. \
         Based on the following research data, provide a clear and informative \
         response to the query: \"{query}\".\n\
         \n\
         Research Data:\n\
         {data}\n\
         \n\
         Provide a well-structured answer in 3-5 sentences, citing the sources \
         where relevant.",
        data = research_block(records),
    )
}

/// One bullet line per record: `- <title>: <content> (Source: <url>)`.
fn research_block(records: &[SearchRecord]) -> String {
    records
        .iter()
        .map(|r| format!("- {}: {} (Source: {})", r.title, r.content, r.url))
        .collect::<Vec<_>>()
        .join("\n")
}
