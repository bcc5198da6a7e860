//! Mock searcher for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::searcher::{RawSearchResult, SearchError, SearchRequest, Searcher};

/// Mock implementation of the `Searcher` trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable search results
/// - Track search requests for assertions
/// - Simulate failures
pub struct MockSearcher {
    results: Arc<RwLock<Vec<RawSearchResult>>>,
    requests: Arc<RwLock<Vec<SearchRequest>>>,
    /// If set, the next search fails with an ApiError of this message.
    next_error: Arc<RwLock<Option<String>>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(Vec::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Configure the results every subsequent search returns.
    pub async fn set_results(&self, results: Vec<RawSearchResult>) {
        *self.results.write().await = results;
    }

    /// Make the next search call fail.
    pub async fn fail_next(&self, message: impl Into<String>) {
        *self.next_error.write().await = Some(message.into());
    }

    /// Requests recorded so far.
    pub async fn recorded_requests(&self) -> Vec<SearchRequest> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Searcher for MockSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawSearchResult>, SearchError> {
        self.requests.write().await.push(request.clone());

        if let Some(message) = self.next_error.write().await.take() {
            return Err(SearchError::ApiError(message));
        }

        Ok(self.results.read().await.clone())
    }
}
