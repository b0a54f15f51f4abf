//! Listing page link discovery
//!
//! This module walks a listing page and collects every item link before
//! any item is visited:
//! - Press releases: tab panes -> anchors, date unknown until visited
//! - Archive: accordion panels -> entries -> (anchor, date label)
//!
//! Links are resolved to absolute URLs and de-duplicated per listing,
//! keeping the site's own order.

use crate::browser::{Browser, BrowserResult, Element};
use crate::crawler::dates::parse_publish_date;
use crate::crawler::extract::{inner_text, ExtractError};
use crate::crawler::site::{ArchiveLayout, PressReleaseLayout};
use crate::model::LinkRecord;
use std::collections::HashSet;
use url::Url;

/// Ordered set of discovered links
#[derive(Debug, Default)]
struct LinkSet {
    links: Vec<LinkRecord>,
    seen: HashSet<String>,
}

impl LinkSet {
    fn push(&mut self, link: LinkRecord) {
        if self.seen.insert(link.url.clone()) {
            self.links.push(link);
        }
    }

    fn into_vec(self) -> Vec<LinkRecord> {
        self.links
    }
}

/// Collects press-release links from the loaded listing page
///
/// # Returns
///
/// * `Ok(Vec<LinkRecord>)` - Undated links in listing order
/// * `Err(BrowserError)` - The listing's sections could not be enumerated
pub async fn discover_press_releases<B: Browser>(
    browser: &mut B,
    layout: &PressReleaseLayout,
) -> BrowserResult<Vec<LinkRecord>> {
    let base = Url::parse(&layout.listing_url).ok();
    let sections = browser.find_all(&layout.section).await?;
    tracing::debug!("Press-release listing has {} sections", sections.len());

    let mut links = LinkSet::default();
    for section in sections {
        let anchors = match section.find_all(&layout.anchor).await {
            Ok(anchors) => anchors,
            Err(e) => {
                tracing::error!("Failed to read press-release section: {}", e);
                continue;
            }
        };

        for anchor in anchors {
            match anchor.attribute("href").await {
                Ok(Some(href)) => {
                    if let Some(url) = resolve_link(&href, base.as_ref()) {
                        links.push(LinkRecord::undated(url));
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::error!("Failed to read press-release link: {}", e),
            }
        }
    }

    let links = links.into_vec();
    tracing::debug!("Discovered {} press-release links", links.len());
    Ok(links)
}

/// Collects dated archive links from the loaded listing page
///
/// Entries without a readable anchor or date label are logged and skipped;
/// links that are not item pages (downloads) are dropped silently.
pub async fn discover_archive<B: Browser>(
    browser: &mut B,
    layout: &ArchiveLayout,
) -> BrowserResult<Vec<LinkRecord>> {
    let base = Url::parse(&layout.listing_url).ok();
    let containers = browser.find_all(&layout.container).await?;
    tracing::debug!("Archive listing has {} panels", containers.len());

    let mut links = LinkSet::default();
    for container in containers {
        let sections = match container.find_all(&layout.section).await {
            Ok(sections) => sections,
            Err(e) => {
                tracing::error!("Failed to read archive panel: {}", e);
                continue;
            }
        };

        for section in sections {
            match read_archive_entry(&section, layout, base.as_ref()).await {
                Ok(Some(link)) => links.push(link),
                Ok(None) => {}
                Err(e) => tracing::error!("Skipping archive entry: {}", e),
            }
        }
    }

    let links = links.into_vec();
    tracing::debug!("Discovered {} archive links", links.len());
    Ok(links)
}

async fn read_archive_entry<E: Element>(
    section: &E,
    layout: &ArchiveLayout,
    base: Option<&Url>,
) -> Result<Option<LinkRecord>, ExtractError> {
    let anchor = section
        .find(&layout.anchor)
        .await?
        .ok_or_else(|| ExtractError::MissingElement {
            what: "archive link",
            locator: layout.anchor.clone(),
        })?;

    let Some(url) = anchor
        .attribute("href")
        .await?
        .and_then(|href| resolve_link(&href, base))
    else {
        return Ok(None);
    };

    if !is_page_link(&url, &layout.page_extension) {
        tracing::debug!("Skipping non-page archive link {}", url);
        return Ok(None);
    }

    let label = section
        .find(&layout.date_label)
        .await?
        .ok_or_else(|| ExtractError::MissingElement {
            what: "archive date label",
            locator: layout.date_label.clone(),
        })?;
    let published = parse_publish_date(&inner_text(&label).await?)?;

    Ok(Some(LinkRecord::dated(url, published)))
}

/// Returns true if the URL's path ends with the page extension
pub fn is_page_link(url: &str, extension: &str) -> bool {
    Url::parse(url)
        .map(|u| u.path().to_ascii_lowercase().ends_with(extension))
        .unwrap_or(false)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };

    if absolute.scheme() == "http" || absolute.scheme() == "https" {
        Some(absolute.to_string())
    } else {
        None
    }
}
