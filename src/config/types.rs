use crate::config::validation::parse_config_date;
use crate::crawler::{SettleDelays, SiteLayout};
use crate::model::Restriction;
use crate::ConfigError;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Visa-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub restrictions: RestrictionsConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Builds the run restriction, without the last-seen marker
    ///
    /// The marker comes from the document store, see `to_last_material`.
    pub fn restriction(&self) -> Result<Restriction, ConfigError> {
        let mut restriction = Restriction::unrestricted();

        if let Some(max) = self.restrictions.maximum_materials {
            restriction = restriction.with_max_materials(max);
        }

        if let Some(raw) = &self.restrictions.from_date {
            let date = parse_config_date(raw)?;
            let midnight = date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| ConfigError::InvalidDate(raw.clone()))?;
            restriction = restriction.with_from_date(Utc.from_utc_datetime(&midnight));
        }

        Ok(restriction)
    }

    /// Visa site layout with the configured timeouts and delays applied
    pub fn site_layout(&self) -> SiteLayout {
        let mut layout = SiteLayout::visa()
            .with_page_load_timeout(Duration::from_secs(self.browser.page_load_timeout))
            .with_consent_timeout(Duration::from_secs(self.browser.consent_timeout));

        if let Some(delays) = &self.browser.delays {
            layout = layout.with_delays(SettleDelays {
                press_listing: Duration::from_millis(delays.press_listing),
                archive_listing: Duration::from_millis(delays.archive_listing),
                item: Duration::from_millis(delays.item),
            });
        }

        layout
    }
}

/// Identity of this source within the host
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Source name recorded with every stored document
    pub name: String,
}

/// Stopping criteria for a run
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestrictionsConfig {
    /// Upper bound on documents accepted in one run
    #[serde(rename = "maximum-materials", default)]
    pub maximum_materials: Option<usize>,

    /// Lower bound on publish date (YYYY-MM-DD)
    #[serde(rename = "from-date", default)]
    pub from_date: Option<String>,

    /// Stop at the most recent document already stored
    #[serde(rename = "to-last-material", default)]
    pub to_last_material: bool,
}

/// Chromium session settings
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// DevTools endpoint of a running Chromium; launches one when absent
    #[serde(rename = "remote-url", default)]
    pub remote_url: Option<String>,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Page-load timeout in seconds
    #[serde(rename = "page-load-timeout", default = "default_page_load_timeout")]
    pub page_load_timeout: u64,

    /// Bound on waiting for the consent button, in seconds
    #[serde(rename = "consent-timeout", default = "default_consent_timeout")]
    pub consent_timeout: u64,

    /// Settle delays; site defaults when absent
    #[serde(default)]
    pub delays: Option<DelaysConfig>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            headless: default_headless(),
            page_load_timeout: default_page_load_timeout(),
            consent_timeout: default_consent_timeout(),
            delays: None,
        }
    }
}

/// Settle delays in milliseconds
#[derive(Debug, Clone, Deserialize)]
pub struct DelaysConfig {
    #[serde(rename = "press-listing")]
    pub press_listing: u64,

    #[serde(rename = "archive-listing")]
    pub archive_listing: u64,

    pub item: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_headless() -> bool {
    true
}

fn default_page_load_timeout() -> u64 {
    40
}

fn default_consent_timeout() -> u64 {
    5
}
