//! Prowlarr search backend implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ProwlarrConfig;

use super::{Protocol, RawSearchResult, SearchError, SearchRequest, Searcher};

const DEFAULT_INDEXER_PRIORITY: i32 = 25;

/// Prowlarr search backend: a single aggregated search endpoint over every
/// indexer configured in Prowlarr.
pub struct ProwlarrSearcher {
    client: Client,
    config: ProwlarrConfig,
}

impl ProwlarrSearcher {
    /// Create a new searcher from configuration.
    pub fn new(config: ProwlarrConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| SearchError::Internal(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Build the Prowlarr API URL for a search.
    fn build_search_url(&self, request: &SearchRequest) -> String {
        let mut url = format!(
            "{}/api/v1/search?query={}&type=search",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(&request.query),
        );

        if let Some(limit) = request.limit {
            url.push_str(&format!("&limit={limit}"));
        }
        if let Some(categories) = &request.categories {
            for category in categories {
                url.push_str(&format!("&categories={category}"));
            }
        }

        url
    }
}

/// One release row in a Prowlarr search response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProwlarrRelease {
    title: String,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    magnet_url: Option<String>,
    #[serde(default)]
    guid: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    seeders: Option<u32>,
    #[serde(default)]
    leechers: Option<u32>,
    #[serde(default)]
    publish_date: Option<DateTime<Utc>>,
    indexer_id: i64,
    indexer: String,
    #[serde(default)]
    indexer_priority: Option<i32>,
    #[serde(default)]
    protocol: Option<String>,
    #[serde(default)]
    categories: Vec<ProwlarrCategory>,
}

#[derive(Debug, Deserialize)]
struct ProwlarrCategory {
    #[serde(default)]
    name: Option<String>,
}

fn map_release(row: ProwlarrRelease) -> Option<RawSearchResult> {
    let link = row
        .download_url
        .or(row.guid)
        .or_else(|| row.magnet_url.clone())?;
    let protocol = match row.protocol.as_deref() {
        Some("usenet") => Protocol::Usenet,
        _ => Protocol::Torrent,
    };
    Some(RawSearchResult {
        title: row.title,
        link,
        magnet_link: row.magnet_url,
        size_bytes: row.size.unwrap_or(0),
        seeders: row.seeders,
        leechers: row.leechers,
        publish_date: row.publish_date,
        indexer_id: row.indexer_id,
        indexer_name: row.indexer,
        indexer_priority: row.indexer_priority.unwrap_or(DEFAULT_INDEXER_PRIORITY),
        category: row.categories.into_iter().find_map(|c| c.name),
        protocol,
    })
}

#[async_trait]
impl Searcher for ProwlarrSearcher {
    fn name(&self) -> &str {
        "prowlarr"
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawSearchResult>, SearchError> {
        let url = self.build_search_url(request);
        debug!(query = %request.query, "searching Prowlarr");

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else if e.is_connect() {
                    SearchError::ConnectionFailed(e.to_string())
                } else {
                    SearchError::ApiError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(SearchError::ApiError(format!(
                "Prowlarr returned HTTP {}",
                response.status()
            )));
        }

        let rows: Vec<ProwlarrRelease> = response
            .json()
            .await
            .map_err(|e| SearchError::ApiError(format!("invalid search response: {e}")))?;

        let results: Vec<RawSearchResult> = rows.into_iter().filter_map(map_release).collect();
        debug!(count = results.len(), "Prowlarr search finished");
        Ok(results)
    }
}
