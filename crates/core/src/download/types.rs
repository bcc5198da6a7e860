//! Types for the download client integration.

use async_trait::async_trait;
use thiserror::Error;

use crate::searcher::Protocol;

/// Errors that can occur when handing a release to a download client.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download client connection failed: {0}")]
    ConnectionFailed(String),

    #[error("download client API error: {0}")]
    ApiError(String),

    #[error("download client authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("no download client configured for {0:?} releases")]
    NoClient(Protocol),

    #[error("request timeout")]
    Timeout,
}

/// Trait for a single download client (torrent or Usenet).
///
/// The client only accepts hand-offs; transfer monitoring and import are the
/// external client's own business.
#[async_trait]
pub trait DownloadService: Send + Sync {
    /// Client name for logging.
    fn name(&self) -> &str;

    /// Which protocol this client accepts.
    fn protocol(&self) -> Protocol;

    /// Hand a release URL (or magnet URI) to the client.
    async fn add(&self, url: &str, category: &str) -> Result<(), DownloadError>;
}
