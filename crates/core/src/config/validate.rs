use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Prowlarr URL/API key are non-empty when the section is present
/// - Download category is non-empty
/// - Scheduler tick intervals are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if let Some(prowlarr) = &config.prowlarr {
        if prowlarr.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "prowlarr.url cannot be empty".to_string(),
            ));
        }
        if prowlarr.api_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "prowlarr.api_key cannot be empty".to_string(),
            ));
        }
    }

    if config.download.category.is_empty() {
        return Err(ConfigError::ValidationError(
            "download.category cannot be empty".to_string(),
        ));
    }

    let scheduler = &config.scheduler;
    if scheduler.search_tick_secs == 0
        || scheduler.rss_tick_secs == 0
        || scheduler.pending_tick_secs == 0
    {
        return Err(ConfigError::ValidationError(
            "scheduler tick intervals cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_from_str, ProwlarrConfig};

    #[test]
    fn test_validate_default_config() {
        let config = load_config_from_str("").unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = load_config_from_str("[server]\nport = 0").unwrap();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_api_key_fails() {
        let mut config = load_config_from_str("").unwrap();
        config.prowlarr = Some(ProwlarrConfig {
            url: "http://localhost:9696".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_tick_fails() {
        let config = load_config_from_str("[scheduler]\nsearch_tick_secs = 0").unwrap();
        assert!(validate_config(&config).is_err());
    }
}
