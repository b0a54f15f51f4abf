use crate::config::types::{BrowserConfig, Config, OutputConfig, RestrictionsConfig, SourceConfig};
use crate::ConfigError;
use chrono::NaiveDate;
use url::Url;

/// Format accepted for `from-date`
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Longest settle delay accepted, in milliseconds
const MAX_DELAY_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_restrictions(&config.restrictions)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates source identity: non-empty, alphanumeric, hyphens and underscores
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "source name cannot be empty".to_string(),
        ));
    }

    if !config
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "source name may only contain alphanumerics, '-' and '_', got '{}'",
            config.name
        )));
    }

    Ok(())
}

fn validate_restrictions(config: &RestrictionsConfig) -> Result<(), ConfigError> {
    if config.maximum_materials == Some(0) {
        return Err(ConfigError::Validation(
            "maximum-materials must be >= 1 when set".to_string(),
        ));
    }

    if let Some(from_date) = &config.from_date {
        parse_config_date(from_date)?;
    }

    Ok(())
}

/// Validates browser settings
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if let Some(remote_url) = &config.remote_url {
        let url = Url::parse(remote_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid remote-url: {}", e)))?;

        if !matches!(url.scheme(), "ws" | "wss" | "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "remote-url must use ws, wss, http or https, got '{}'",
                remote_url
            )));
        }
    }

    if config.page_load_timeout < 1 {
        return Err(ConfigError::Validation(
            "page-load-timeout must be >= 1s".to_string(),
        ));
    }

    if config.consent_timeout < 1 {
        return Err(ConfigError::Validation(
            "consent-timeout must be >= 1s".to_string(),
        ));
    }

    if let Some(delays) = &config.delays {
        for (name, value) in [
            ("press-listing", delays.press_listing),
            ("archive-listing", delays.archive_listing),
            ("item", delays.item),
        ] {
            if value > MAX_DELAY_MS {
                return Err(ConfigError::Validation(format!(
                    "delay '{}' must be <= {}ms, got {}ms",
                    name, MAX_DELAY_MS, value
                )));
            }
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Parses a `YYYY-MM-DD` config date
pub(crate) fn parse_config_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        ConfigError::InvalidDate(format!("'{}' is not {} ({})", value, DATE_FORMAT, e))
    })
}
