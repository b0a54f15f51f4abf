//! Data model shared between the crawler and its host
//!
//! - `Document`: the unit of output handed to the intake function
//! - `Restriction`: host-supplied stopping criteria for one run
//! - `LinkRecord`: a discovered item link, consumed once
//! - `SourceRef` / `PluginDescriptor`: identity of the plugin within the host

mod document;
mod restriction;

pub use document::{Document, DocumentError};
pub use restriction::{DateBreach, Restriction};

use chrono::{DateTime, Utc};

/// A navigable item discovered on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// Absolute URL of the item page
    pub url: String,

    /// Publish date, when the listing shows one next to the link
    pub published: Option<DateTime<Utc>>,
}

impl LinkRecord {
    /// A link whose publish date is only known after visiting it
    pub fn undated(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            published: None,
        }
    }

    /// A link whose publish date was read off the listing
    pub fn dated(url: impl Into<String>, published: DateTime<Utc>) -> Self {
        Self {
            url: url.into(),
            published: Some(published),
        }
    }
}

/// Kind of plugin registered with the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Source,
    Ml,
    Pipeline,
}

/// Identity token the host assigns to this source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub name: String,
    pub kind: SourceKind,
}

impl SourceRef {
    pub fn source(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Source,
        }
    }
}

/// Descriptor of the plugin payload as registered with the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    /// Unique source reference
    pub reference: String,

    /// Files the host keeps for this plugin
    pub files: Vec<String>,

    /// Entry point the host invokes
    pub entry: String,
}

impl PluginDescriptor {
    /// Descriptor for the Visa newsroom source
    pub fn visa() -> Self {
        Self {
            reference: "visa".to_string(),
            files: vec!["visa_harvest".to_string()],
            entry: "CrawlController::run".to_string(),
        }
    }
}
