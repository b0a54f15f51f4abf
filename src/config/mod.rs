//! Configuration module for Visa-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use visa_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("visa.toml")).unwrap();
//! println!("Harvesting into: {}", config.output.database_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, DelaysConfig, OutputConfig, RestrictionsConfig, SourceConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
