//! Tavily web search: capped request, record normalization, content clipping.

pub(crate) mod client;
mod normalize;
pub(crate) mod types;

pub use client::{SearchError, SearchProvider, TavilyClient};
pub use types::SearchRecord;
