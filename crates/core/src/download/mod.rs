//! Download client integration.
//!
//! The decision engine only ever *hands off* a winning release; transferring
//! and importing it is the external client's job. `DownloadDispatcher`
//! routes a hand-off to the configured client for the release's protocol.

mod qbittorrent;
mod sabnzbd;
mod types;

pub use qbittorrent::QbittorrentClient;
pub use sabnzbd::SabnzbdClient;
pub use types::{DownloadError, DownloadService};

use std::sync::Arc;

use crate::searcher::Protocol;

/// Routes hand-offs to the configured download client per protocol.
pub struct DownloadDispatcher {
    services: Vec<Arc<dyn DownloadService>>,
}

impl DownloadDispatcher {
    pub fn new(services: Vec<Arc<dyn DownloadService>>) -> Self {
        Self { services }
    }

    /// A dispatcher with no clients; every hand-off fails with `NoClient`.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Hand a torrent release (magnet URI or .torrent URL) to the torrent
    /// client.
    pub async fn add_torrent(&self, url: &str, category: &str) -> Result<(), DownloadError> {
        self.dispatch(Protocol::Torrent, url, category).await
    }

    /// Hand an NZB URL to the Usenet client.
    pub async fn add_nzb(&self, url: &str, category: &str) -> Result<(), DownloadError> {
        self.dispatch(Protocol::Usenet, url, category).await
    }

    /// Hand off by protocol.
    pub async fn add(
        &self,
        protocol: Protocol,
        url: &str,
        category: &str,
    ) -> Result<(), DownloadError> {
        self.dispatch(protocol, url, category).await
    }

    pub fn has_client_for(&self, protocol: Protocol) -> bool {
        self.services.iter().any(|s| s.protocol() == protocol)
    }

    async fn dispatch(
        &self,
        protocol: Protocol,
        url: &str,
        category: &str,
    ) -> Result<(), DownloadError> {
        let service = self
            .services
            .iter()
            .find(|s| s.protocol() == protocol)
            .ok_or(DownloadError::NoClient(protocol))?;
        service.add(url, category).await
    }
}
