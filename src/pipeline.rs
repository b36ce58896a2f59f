//! Two-step research run: retrieve search records, then draft an answer.

use tracing::{debug, info, warn};

use crate::openai::{CompletionError, CompletionProvider};
use crate::prompt;
use crate::tavily::{SearchError, SearchProvider, SearchRecord};

#[derive(Debug)]
pub struct ResearchState {
    pub query: String,
    pub records: Vec<SearchRecord>,
    pub final_answer: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("{0}")]
    Search(#[from] SearchError),

    #[error("{0}")]
    Completion(#[from] CompletionError),
}

/// Steps run strictly in order; the first failure aborts the run.
pub async fn run(
    search: &impl SearchProvider,
    llm: &impl CompletionProvider,
    query: &str,
) -> Result<ResearchState, ResearchError> {
    let records = search.search(query).await?;
    if records.is_empty() {
        warn!("search returned no results; drafting from the query alone");
    }
    debug!(records = records.len(), "retrieval step complete");

    let prompt = prompt::render(query, &records);
    let final_answer = llm.complete(&prompt).await?;

    let state = ResearchState {
        query: query.to_string(),
        records,
        final_answer,
    };
    info!(query = %state.query, records = state.records.len(), "research run complete");

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct MockSearch {
        responses: Mutex<VecDeque<Result<Vec<SearchRecord>, SearchError>>>,
        queries: Mutex<Vec<String>>,
    }

    impl MockSearch {
        fn with_records(records: Vec<SearchRecord>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from([Ok(records)])),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn failing(error: SearchError) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from([Err(error)])),
                queries: Mutex::new(Vec::new()),
            }
        }

        fn captured_queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl SearchProvider for MockSearch {
        async fn search(&self, query: &str) -> Result<Vec<SearchRecord>, SearchError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(SearchError::RateLimited))
        }
    }

    struct MockCompletion {
        responses: Mutex<VecDeque<Result<String, CompletionError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockCompletion {
        fn with_answer(answer: &str) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from([Ok(answer.to_string())])),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing(error: CompletionError) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from([Err(error)])),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn captured_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl CompletionProvider for MockCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(CompletionError::RateLimited))
        }
    }

    fn make_records(entries: Vec<(&str, &str)>) -> Vec<SearchRecord> {
        entries
            .into_iter()
            .map(|(title, url)| SearchRecord {
                title: title.to_string(),
                url: url.to_string(),
                content: format!("content about {title}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn run_returns_completion_text_unchanged() {
        let search = MockSearch::with_records(make_records(vec![
            ("Rust Book", "https://doc.rust-lang.org/book/"),
            ("Rustonomicon", "https://doc.rust-lang.org/nomicon/"),
        ]));
        let llm = MockCompletion::with_answer("Answer X.");

        let state = run(&search, &llm, "what is rust").await.unwrap();

        assert_eq!(state.final_answer, "Answer X.");
        assert_eq!(state.query, "what is rust");
        assert_eq!(state.records.len(), 2);
        assert_eq!(search.captured_queries(), vec!["what is rust"]);
    }

    #[tokio::test]
    async fn run_renders_records_into_prompt_in_order() {
        let search = MockSearch::with_records(make_records(vec![
            ("First", "https://one.example"),
            ("Second", "https://two.example"),
        ]));
        let llm = MockCompletion::with_answer("ok");

        run(&search, &llm, "ordering").await.unwrap();

        let prompts = llm.captured_prompts();
        assert_eq!(prompts.len(), 1);
        let prompt = &prompts[0];
        assert!(prompt.contains("\"ordering\""));
        let first = prompt.find("https://one.example").unwrap();
        let second = prompt.find("https://two.example").unwrap();
        assert!(first < second);
        assert!(prompt.contains("First"));
        assert!(prompt.contains("Second"));
    }

    #[tokio::test]
    async fn run_with_zero_records_still_drafts() {
        let search = MockSearch::with_records(vec![]);
        let llm = MockCompletion::with_answer("Nothing found, but here is an answer.");

        let state = run(&search, &llm, "obscure").await.unwrap();

        assert!(state.records.is_empty());
        assert_eq!(state.final_answer, "Nothing found, but here is an answer.");

        let prompts = llm.captured_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Research Data:"));
    }

    #[tokio::test]
    async fn run_search_failure_skips_completion() {
        let search = MockSearch::failing(SearchError::RateLimited);
        let llm = MockCompletion::with_answer("never drafted");

        let err = run(&search, &llm, "test").await.unwrap_err();

        assert!(matches!(err, ResearchError::Search(_)));
        assert!(llm.captured_prompts().is_empty());
    }

    #[tokio::test]
    async fn run_completion_failure_propagates() {
        let search = MockSearch::with_records(make_records(vec![(
            "Rust Book",
            "https://doc.rust-lang.org/book/",
        )]));
        let llm = MockCompletion::failing(CompletionError::RateLimited);

        let err = run(&search, &llm, "test").await.unwrap_err();

        assert!(matches!(err, ResearchError::Completion(_)));
        assert!(err.to_string().contains("rate limit"));
    }
}
