//! Visa-Harvest: a single-source press-release harvester
//!
//! This crate drives a browser handle over the Visa newsroom press-release
//! listing and the consulting archive, turns every item page into a
//! [`Document`](model::Document) and hands each one to a host intake
//! function, stopping early when the run's restriction says so.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod intake;
pub mod model;

use thiserror::Error;

/// Main error type for Visa-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Intake storage error: {0}")]
    Storage(#[from] intake::StorageError),

    #[error("Crawl error: {0}")]
    Parser(#[from] crawler::ParserError),
}

impl HarvestError {
    /// Returns true if the run ended through the restriction or the host
    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Parser(e) if e.is_finish())
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid date in config: {0}")]
    InvalidDate(String),
}

/// Result type alias for Visa-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlController, ParserError, RunSummary, SiteLayout, StopReason};
pub use model::{Document, LinkRecord, PluginDescriptor, Restriction, SourceRef};
