//! Item page extraction
//!
//! Reads title, body and (for press releases) the publish date off the page
//! currently loaded in the browser and builds a `Document`.

use crate::browser::{Browser, BrowserError, Element, Locator};
use crate::crawler::dates::{parse_publish_date, DateParseError};
use crate::crawler::site::{ArchiveLayout, PressReleaseLayout};
use crate::model::{Document, DocumentError};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Reasons an item page yields no document
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{what} not found ({locator})")]
    MissingElement {
        what: &'static str,
        locator: Locator,
    },

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Bad publish date: {0}")]
    Date(#[from] DateParseError),

    #[error("Invalid document: {0}")]
    Document(#[from] DocumentError),
}

/// Extracts a press release from the loaded page
///
/// The publish date is only available on the item page itself.
pub async fn extract_press_release<B: Browser>(
    browser: &mut B,
    layout: &PressReleaseLayout,
    url: &str,
) -> Result<Document, ExtractError> {
    let title = required_text(browser, &layout.title, "title").await?;
    let raw_date = required_text(browser, &layout.date, "publish date").await?;
    let published = parse_publish_date(&raw_date)?;
    let text = required_text(browser, &layout.body, "body").await?;

    Ok(Document::new(&title, &text, url, published, Utc::now())?)
}

/// Extracts an archive entry from the loaded page
///
/// The publish date was read off the archive listing.
pub async fn extract_archive_page<B: Browser>(
    browser: &mut B,
    layout: &ArchiveLayout,
    url: &str,
    published: DateTime<Utc>,
) -> Result<Document, ExtractError> {
    let title = required_text(browser, &layout.title, "title").await?;
    let text = required_text(browser, &layout.body, "body").await?;

    Ok(Document::new(&title, &text, url, published, Utc::now())?)
}

async fn required_text<B: Browser>(
    browser: &mut B,
    locator: &Locator,
    what: &'static str,
) -> Result<String, ExtractError> {
    let element = browser
        .find(locator)
        .await?
        .ok_or_else(|| ExtractError::MissingElement {
            what,
            locator: locator.clone(),
        })?;
    Ok(element.text().await?)
}

/// Text of an element that may sit in a collapsed panel
///
/// Hidden elements report empty rendered text, so `innerText` is read first.
pub async fn inner_text<E: Element>(element: &E) -> Result<String, BrowserError> {
    match element.attribute("innerText").await? {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => element.text().await,
    }
}
