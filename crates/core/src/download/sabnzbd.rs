//! SABnzbd download client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::SabnzbdConfig;
use crate::searcher::Protocol;

use super::{DownloadError, DownloadService};

/// SABnzbd API client. Single-call auth: the API key rides along on every
/// request.
pub struct SabnzbdClient {
    client: Client,
    config: SabnzbdConfig,
}

#[derive(Debug, Deserialize)]
struct SabnzbdResponse {
    status: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SabnzbdClient {
    pub fn new(config: SabnzbdConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| DownloadError::ApiError(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn build_addurl(&self, url: &str, category: &str) -> String {
        format!(
            "{}/api?mode=addurl&name={}&cat={}&apikey={}&output=json",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(url),
            urlencoding::encode(category),
            urlencoding::encode(&self.config.api_key),
        )
    }
}

#[async_trait]
impl DownloadService for SabnzbdClient {
    fn name(&self) -> &str {
        "sabnzbd"
    }

    fn protocol(&self) -> Protocol {
        Protocol::Usenet
    }

    async fn add(&self, url: &str, category: &str) -> Result<(), DownloadError> {
        let endpoint = self.build_addurl(url, category);

        let response = self.client.get(&endpoint).send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadError::Timeout
            } else if e.is_connect() {
                DownloadError::ConnectionFailed(e.to_string())
            } else {
                DownloadError::ApiError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(DownloadError::ApiError(format!(
                "SABnzbd returned HTTP {}",
                response.status()
            )));
        }

        let body: SabnzbdResponse = response
            .json()
            .await
            .map_err(|e| DownloadError::ApiError(format!("invalid SABnzbd response: {e}")))?;

        if !body.status {
            return Err(DownloadError::ApiError(
                body.error.unwrap_or_else(|| "addurl rejected".to_string()),
            ));
        }

        debug!(category = category, "NZB handed to SABnzbd");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_addurl_encodes_params() {
        let client = SabnzbdClient::new(SabnzbdConfig {
            url: "http://localhost:8085/".to_string(),
            api_key: "key with space".to_string(),
            timeout_secs: 30,
        })
        .unwrap();
        let url = client.build_addurl("https://indexer.example/get/9.nzb?x=1&y=2", "media");
        assert!(url.starts_with("http://localhost:8085/api?mode=addurl&name=https%3A%2F%2F"));
        assert!(url.contains("&cat=media"));
        assert!(url.contains("&apikey=key%20with%20space"));
        assert!(!url.contains("y=2&")); // query of the nzb url stays encoded
    }

    #[test]
    fn test_response_parsing() {
        let ok: SabnzbdResponse = serde_json::from_str(r#"{"status": true}"#).unwrap();
        assert!(ok.status);
        let err: SabnzbdResponse =
            serde_json::from_str(r#"{"status": false, "error": "API Key Incorrect"}"#).unwrap();
        assert!(!err.status);
        assert_eq!(err.error.as_deref(), Some("API Key Incorrect"));
    }
}
