use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::scheduler::SchedulerConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Search provider (required for any searching to happen)
    #[serde(default)]
    pub prowlarr: Option<ProwlarrConfig>,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    7878
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("grabbit.db")
}

/// Prowlarr search provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProwlarrConfig {
    /// Prowlarr server URL (e.g. "http://localhost:9696")
    pub url: String,
    /// Prowlarr API key
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Download client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Category/label attached to every hand-off
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub qbittorrent: Option<QbittorrentConfig>,
    #[serde(default)]
    pub sabnzbd: Option<SabnzbdConfig>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            category: default_category(),
            qbittorrent: None,
            sabnzbd: None,
        }
    }
}

fn default_category() -> String {
    "grabbit".to_string()
}

/// qBittorrent client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QbittorrentConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// SABnzbd client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SabnzbdConfig {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prowlarr: Option<SanitizedProwlarrConfig>,
    pub download: SanitizedDownloadConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedProwlarrConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDownloadConfig {
    pub category: String,
    pub qbittorrent_configured: bool,
    pub sabnzbd_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            prowlarr: config.prowlarr.as_ref().map(|p| SanitizedProwlarrConfig {
                url: p.url.clone(),
                api_key_configured: !p.api_key.is_empty(),
                timeout_secs: p.timeout_secs,
            }),
            download: SanitizedDownloadConfig {
                category: config.download.category.clone(),
                qbittorrent_configured: config.download.qbittorrent.is_some(),
                sabnzbd_configured: config.download.sabnzbd.is_some(),
            },
            scheduler: config.scheduler.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_sections() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 7878);
        assert_eq!(config.database.path, PathBuf::from("grabbit.db"));
        assert!(config.prowlarr.is_none());
        assert!(!config.scheduler.enabled);
    }

    #[test]
    fn test_download_config_defaults() {
        let config: DownloadConfig = toml::from_str("").unwrap();
        assert_eq!(config.category, "grabbit");
        assert!(config.qbittorrent.is_none());
    }

    #[test]
    fn test_sanitized_config_redacts_secrets() {
        let config = Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            prowlarr: Some(ProwlarrConfig {
                url: "http://localhost:9696".to_string(),
                api_key: "topsecret".to_string(),
                timeout_secs: 30,
            }),
            download: DownloadConfig {
                category: "grabbit".to_string(),
                qbittorrent: Some(QbittorrentConfig {
                    url: "http://localhost:8080".to_string(),
                    username: "admin".to_string(),
                    password: "hunter2".to_string(),
                    timeout_secs: 30,
                }),
                sabnzbd: None,
            },
            scheduler: SchedulerConfig::default(),
        };
        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("topsecret"));
        assert!(!json.contains("hunter2"));
        assert!(json.contains("\"api_key_configured\":true"));
        assert!(json.contains("\"qbittorrent_configured\":true"));
    }
}
