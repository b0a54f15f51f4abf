//! Crawler module for the Visa newsroom
//!
//! This module contains the harvesting logic, including:
//! - Site layout (URLs, locators, settle delays)
//! - Page navigation and consent-dialog dismissal
//! - Listing link discovery and item extraction
//! - Publish-date parsing
//! - Overall run control and restriction enforcement

mod controller;
mod dates;
mod extract;
mod listing;
mod navigator;
mod site;

pub use controller::{
    CrawlController, ItemOutcome, ParserError, RunState, RunSummary, SkipReason, StopReason,
};
pub use dates::{parse_publish_date, DateParseError};
pub use extract::{extract_archive_page, extract_press_release, inner_text, ExtractError};
pub use listing::{discover_archive, discover_press_releases, is_page_link, resolve_link};
pub use navigator::PageNavigator;
pub use site::{ArchiveLayout, ConsentLayout, PressReleaseLayout, SettleDelays, SiteLayout};

use crate::browser::Browser;
use crate::intake::Intake;
use crate::model::{PluginDescriptor, Restriction, SourceRef};

/// Runs a complete harvest against the Visa site
///
/// This is the main entry point for a host. It will:
/// 1. Configure the browser's page-load timeout
/// 2. Walk the press-release listing, skipping items older than the bound
/// 3. Walk the archive listing, stopping at the first item older than the bound
/// 4. Hand every extracted document to `intake`
///
/// # Returns
///
/// * `Ok(RunSummary)` - Both listings were exhausted
/// * `Err(ParserError::Finish)` - The run ended early; the host decides
///   whether that is a failure
pub async fn harvest<B: Browser, I: Intake>(
    source: SourceRef,
    restriction: Restriction,
    layout: SiteLayout,
    browser: &mut B,
    intake: I,
) -> Result<RunSummary, ParserError> {
    CrawlController::new(source, PluginDescriptor::visa(), restriction, browser, intake)
        .with_layout(layout)
        .run()
        .await
}
