/// Host-supplied stopping criteria for a crawl run
use crate::model::Document;
use chrono::{DateTime, Utc};
use std::fmt;

/// Restriction for one run, read-only once the crawler is built
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Restriction {
    /// Items published before this instant are out of range
    pub from_date: Option<DateTime<Utc>>,

    /// Ceiling on accepted documents, enforced by the intake function
    pub max_materials: Option<usize>,

    /// Stop once this document is met again
    pub last_seen_document: Option<Document>,
}

/// An item dated before the restriction's lower bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBreach {
    pub bound: DateTime<Utc>,
    pub published: DateTime<Utc>,
}

impl fmt::Display for DateBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "published {} is before from_date {}",
            self.published.to_rfc3339(),
            self.bound.to_rfc3339()
        )
    }
}

impl Restriction {
    /// A restriction that never stops the crawl
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn with_from_date(mut self, from_date: DateTime<Utc>) -> Self {
        self.from_date = Some(from_date);
        self
    }

    pub fn with_max_materials(mut self, max_materials: usize) -> Self {
        self.max_materials = Some(max_materials);
        self
    }

    pub fn with_last_seen(mut self, document: Document) -> Self {
        self.last_seen_document = Some(document);
        self
    }

    /// Checks a publish date against the lower bound
    ///
    /// A date equal to the bound is still in range.
    pub fn check_date(&self, published: DateTime<Utc>) -> Result<(), DateBreach> {
        match self.from_date {
            Some(bound) if published < bound => Err(DateBreach { bound, published }),
            _ => Ok(()),
        }
    }

    /// Returns true if the document is the last one seen by a previous run
    pub fn is_last_seen(&self, document: &Document) -> bool {
        self.last_seen_document
            .as_ref()
            .is_some_and(|seen| seen.url == document.url)
    }
}
