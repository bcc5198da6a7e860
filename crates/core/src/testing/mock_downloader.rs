//! Mock download client for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::download::{DownloadError, DownloadService};
use crate::searcher::Protocol;

/// A recorded hand-off for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedHandOff {
    pub url: String,
    pub category: String,
}

/// Mock implementation of the `DownloadService` trait.
pub struct MockDownloader {
    protocol: Protocol,
    handoffs: Arc<RwLock<Vec<RecordedHandOff>>>,
    fail_all: Arc<RwLock<bool>>,
}

impl MockDownloader {
    pub fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            handoffs: Arc::new(RwLock::new(Vec::new())),
            fail_all: Arc::new(RwLock::new(false)),
        }
    }

    pub fn torrent() -> Self {
        Self::new(Protocol::Torrent)
    }

    pub fn usenet() -> Self {
        Self::new(Protocol::Usenet)
    }

    /// Make every hand-off fail until cleared.
    pub async fn set_failing(&self, failing: bool) {
        *self.fail_all.write().await = failing;
    }

    pub async fn recorded(&self) -> Vec<RecordedHandOff> {
        self.handoffs.read().await.clone()
    }

    pub async fn handoff_count(&self) -> usize {
        self.handoffs.read().await.len()
    }
}

#[async_trait]
impl DownloadService for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    fn protocol(&self) -> Protocol {
        self.protocol
    }

    async fn add(&self, url: &str, category: &str) -> Result<(), DownloadError> {
        if *self.fail_all.read().await {
            return Err(DownloadError::ApiError("mock failure".to_string()));
        }
        self.handoffs.write().await.push(RecordedHandOff {
            url: url.to_string(),
            category: category.to_string(),
        });
        Ok(())
    }
}
