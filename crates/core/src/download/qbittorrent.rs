//! qBittorrent download client implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::QbittorrentConfig;
use crate::searcher::Protocol;

use super::{DownloadError, DownloadService};

/// qBittorrent Web API client. Sessions authenticate with a cookie obtained
/// from the login endpoint; the cookie jar holds it and a 403 triggers one
/// re-login and retry.
pub struct QbittorrentClient {
    client: Client,
    config: QbittorrentConfig,
    /// Marker that a login succeeded; the actual cookie lives in the jar.
    session: Arc<RwLock<bool>>,
}

impl QbittorrentClient {
    pub fn new(config: QbittorrentConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .cookie_store(true)
            .build()
            .map_err(|e| DownloadError::ApiError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            session: Arc::new(RwLock::new(false)),
        })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    async fn login(&self) -> Result<(), DownloadError> {
        let url = format!("{}/api/v2/auth/login", self.base_url());
        let params = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if body.contains("Ok.") {
            debug!("qBittorrent login successful");
            *self.session.write().await = true;
            Ok(())
        } else if body.contains("Fails.") || status.as_u16() == 403 {
            Err(DownloadError::AuthenticationFailed(
                "invalid credentials".to_string(),
            ))
        } else {
            Err(DownloadError::AuthenticationFailed(format!(
                "unexpected login response: {}",
                body.chars().take(100).collect::<String>()
            )))
        }
    }

    async fn ensure_authenticated(&self) -> Result<(), DownloadError> {
        if *self.session.read().await {
            return Ok(());
        }
        self.login().await
    }

    async fn post_add(&self, url: &str, category: &str) -> Result<reqwest::Response, DownloadError> {
        let endpoint = format!("{}/api/v2/torrents/add", self.base_url());
        let params = [("urls", url), ("category", category)];
        self.client
            .post(&endpoint)
            .form(&params)
            .send()
            .await
            .map_err(map_reqwest_error)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> DownloadError {
    if e.is_timeout() {
        DownloadError::Timeout
    } else if e.is_connect() {
        DownloadError::ConnectionFailed(e.to_string())
    } else {
        DownloadError::ApiError(e.to_string())
    }
}

#[async_trait]
impl DownloadService for QbittorrentClient {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    fn protocol(&self) -> Protocol {
        Protocol::Torrent
    }

    async fn add(&self, url: &str, category: &str) -> Result<(), DownloadError> {
        self.ensure_authenticated().await?;

        let mut response = self.post_add(url, category).await?;

        if response.status().as_u16() == 403 {
            warn!("qBittorrent session expired, re-authenticating");
            *self.session.write().await = false;
            self.login().await?;
            response = self.post_add(url, category).await?;
        }

        if !response.status().is_success() {
            return Err(DownloadError::ApiError(format!(
                "qBittorrent returned HTTP {}",
                response.status()
            )));
        }

        debug!(category = category, "torrent handed to qBittorrent");
        Ok(())
    }
}
