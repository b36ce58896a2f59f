//! OpenAI chat completions: deterministic answer drafting from a rendered prompt.

pub(crate) mod client;
pub(crate) mod types;

pub use client::{CompletionError, CompletionProvider, OpenAiClient};
