//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::models::{Paper, PaperBuilder, SourceType};
use crate::sources::{Source, SourceError};

/// What a mock source returns once its script is exhausted
#[derive(Debug, Clone)]
enum Fallback {
    Papers(Vec<Paper>),
    Error(fn() -> SourceError),
}

/// A mock source for testing that returns predefined responses.
///
/// Scripted responses are returned one per call, in order. After the script
/// runs out every call returns the fallback (an empty list unless changed).
/// Every call is recorded.
#[derive(Debug)]
pub struct MockSource {
    id: String,
    script: Mutex<VecDeque<Result<Vec<Paper>, SourceError>>>,
    fallback: Mutex<Fallback>,
    calls: Mutex<Vec<(String, usize)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockSource {
    /// Create a new mock source returning empty lists.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Fallback::Papers(Vec::new())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Return `papers` from every call.
    pub fn with_papers(self, papers: Vec<Paper>) -> Self {
        *lock(&self.fallback) = Fallback::Papers(papers);
        self
    }

    /// Fail every call with the error built by `make_error`.
    pub fn failing(self, make_error: fn() -> SourceError) -> Self {
        *lock(&self.fallback) = Fallback::Error(make_error);
        self
    }

    /// Queue a response for the next unscripted call.
    pub fn push_response(&self, response: Result<Vec<Paper>, SourceError>) {
        lock(&self.script).push_back(response);
    }

    /// Number of search calls received.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// `(query, limit)` of every call received, in order.
    pub fn calls(&self) -> Vec<(String, usize)> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Paper>, SourceError> {
        lock(&self.calls).push((query.to_string(), limit));

        if let Some(response) = lock(&self.script).pop_front() {
            return response;
        }

        match &*lock(&self.fallback) {
            Fallback::Papers(papers) => Ok(papers.clone()),
            Fallback::Error(make_error) => Err(make_error()),
        }
    }
}

/// Helper function to create a plausible paper for testing.
pub fn make_paper(title: &str, year: i32, citations: u32, source: SourceType) -> Paper {
    PaperBuilder::new(title, year, source)
        .authors(["Test Author"])
        .venue("Test Journal")
        .citations(citations)
        .build()
}
