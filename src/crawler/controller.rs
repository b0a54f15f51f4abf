//! Crawl controller - run orchestration
//!
//! This module drives one harvesting run:
//! - Press-release listing traversal, then archive listing traversal
//! - Per-item visit, extraction and restriction check
//! - Submission to the host intake
//! - Classification of every failure into "continue", "skip this item"
//!   or "stop the whole run"

use crate::browser::{Browser, BrowserError};
use crate::crawler::extract::{extract_archive_page, extract_press_release, ExtractError};
use crate::crawler::listing::{discover_archive, discover_press_releases};
use crate::crawler::navigator::PageNavigator;
use crate::crawler::site::SiteLayout;
use crate::intake::{Intake, IntakeError};
use crate::model::{DateBreach, Document, LinkRecord, PluginDescriptor, Restriction, SourceRef};
use std::fmt;
use thiserror::Error;
use tracing::Instrument;

/// Where a run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    PressReleases,
    Archive,

    /// Both traversals exhausted
    Done,

    /// Stopped by the restriction or the host
    FinishedEarly,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::FinishedEarly)
    }
}

/// Why a run ended before both traversals were exhausted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// An archive item was older than the restriction's lower bound
    DateBoundCrossed { url: String, breach: DateBreach },

    /// The last document seen by a previous run came up again
    LastSeenReached { url: String },

    /// The intake signalled the end of the run
    Host(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateBoundCrossed { url, breach } => {
                write!(f, "from_date bound crossed at {}: {}", url, breach)
            }
            Self::LastSeenReached { url } => write!(f, "last seen document reached: {}", url),
            Self::Host(message) => write!(f, "host finished the run: {}", message),
        }
    }
}

/// Why a single item produced no document
#[derive(Debug)]
pub enum SkipReason {
    /// Published before the lower bound, outside the governing traversal
    BeforeFromDate(DateBreach),

    /// The page did not yield a valid document
    Extraction(ExtractError),

    /// The intake refused the document without ending the run
    Rejected(IntakeError),
}

/// Result of handling one item
#[derive(Debug)]
pub enum ItemOutcome {
    Submitted,
    SkipItem(SkipReason),
    StopRun(StopReason),
}

/// Errors returned by a crawl run
#[derive(Debug, Error)]
pub enum ParserError {
    /// The distinguished run-ending condition
    #[error("Crawl finished early: {0}")]
    Finish(StopReason),

    #[error("Browser setup failed: {0}")]
    Browser(#[from] BrowserError),
}

impl ParserError {
    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish(_))
    }
}

/// Counters for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Links collected from both listings
    pub discovered: usize,

    /// Documents accepted by the intake
    pub submitted: usize,

    /// Items skipped by the date restriction
    pub skipped: usize,

    /// Items lost to extraction failures or intake rejections
    pub failed: usize,
}

/// Harvests the Visa newsroom into a host intake
///
/// The browser handle is borrowed for the lifetime of the controller;
/// the host keeps ownership and closes it.
pub struct CrawlController<'a, B: Browser, I: Intake> {
    source: SourceRef,
    plugin: PluginDescriptor,
    restriction: Restriction,
    layout: SiteLayout,
    navigator: PageNavigator<'a, B>,
    intake: I,
    state: RunState,
}

impl<'a, B: Browser, I: Intake> CrawlController<'a, B, I> {
    /// Creates a controller for the Visa site layout
    ///
    /// # Arguments
    ///
    /// * `source` - Identity token assigned by the host
    /// * `plugin` - Plugin descriptor
    /// * `restriction` - Stopping criteria for this run
    /// * `browser` - Injected browser handle
    /// * `intake` - Submission function receiving each document
    pub fn new(
        source: SourceRef,
        plugin: PluginDescriptor,
        restriction: Restriction,
        browser: &'a mut B,
        intake: I,
    ) -> Self {
        let layout = SiteLayout::visa();
        let navigator = PageNavigator::new(browser, layout.consent.clone());

        Self {
            source,
            plugin,
            restriction,
            layout,
            navigator,
            intake,
            state: RunState::Idle,
        }
    }

    /// Replaces the site layout (delays, locators, URLs)
    pub fn with_layout(mut self, layout: SiteLayout) -> Self {
        self.navigator.set_consent(layout.consent.clone());
        self.layout = layout;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }

    pub fn plugin(&self) -> &PluginDescriptor {
        &self.plugin
    }

    pub fn restriction(&self) -> &Restriction {
        &self.restriction
    }

    pub fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    pub fn intake(&self) -> &I {
        &self.intake
    }

    pub fn into_intake(self) -> I {
        self.intake
    }

    /// Runs both traversals
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - Both listings were exhausted
    /// * `Err(ParserError::Finish)` - The restriction or the host ended the run
    /// * `Err(ParserError::Browser)` - The browser handle could not be configured
    pub async fn run(&mut self) -> Result<RunSummary, ParserError> {
        let span = tracing::info_span!(
            "crawl",
            source = %self.source.name,
            plugin = %self.plugin.reference,
            entry = %self.plugin.entry
        );
        self.run_traversals().instrument(span).await
    }

    async fn run_traversals(&mut self) -> Result<RunSummary, ParserError> {
        tracing::info!("Parser enter to {}", self.layout.host);
        tracing::debug!(
            "Plugin {} registered with files {:?}, entry {}",
            self.plugin.reference,
            self.plugin.files,
            self.plugin.entry
        );

        self.navigator
            .browser()
            .set_page_load_timeout(self.layout.page_load_timeout)
            .await?;

        let mut summary = RunSummary::default();

        self.state = RunState::PressReleases;
        if let Err(reason) = self.crawl_press_releases(&mut summary).await {
            return Err(self.finish_early(reason, &summary));
        }

        self.state = RunState::Archive;
        if let Err(reason) = self.crawl_archive(&mut summary).await {
            return Err(self.finish_early(reason, &summary));
        }

        self.state = RunState::Done;
        tracing::info!(
            "Crawl completed: {} discovered, {} submitted, {} skipped, {} failed",
            summary.discovered,
            summary.submitted,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    fn finish_early(&mut self, reason: StopReason, summary: &RunSummary) -> ParserError {
        self.state = RunState::FinishedEarly;
        tracing::info!(
            "Crawl finished early after {} submitted documents: {}",
            summary.submitted,
            reason
        );
        ParserError::Finish(reason)
    }

    async fn crawl_press_releases(&mut self, summary: &mut RunSummary) -> Result<(), StopReason> {
        let listing_url = self.layout.press_releases.listing_url.clone();
        tracing::debug!("Start parse press-releases from url: {}", listing_url);

        if let Err(e) = self
            .navigator
            .visit(&listing_url, self.layout.delays.press_listing)
            .await
        {
            tracing::error!("Failed to load press-release listing {}: {}", listing_url, e);
            return Ok(());
        }

        let links =
            match discover_press_releases(self.navigator.browser(), &self.layout.press_releases)
                .await
            {
                Ok(links) => links,
                Err(e) => {
                    tracing::error!("Failed to read press-release listing {}: {}", listing_url, e);
                    return Ok(());
                }
            };
        summary.discovered += links.len();

        for link in links {
            let outcome = self.process_press_release(&link).await;
            record(outcome, &link, summary)?;
        }

        Ok(())
    }

    async fn crawl_archive(&mut self, summary: &mut RunSummary) -> Result<(), StopReason> {
        let listing_url = self.layout.archive.listing_url.clone();
        tracing::debug!("Start parse archive from url: {}", listing_url);

        if let Err(e) = self
            .navigator
            .visit(&listing_url, self.layout.delays.archive_listing)
            .await
        {
            tracing::error!("Failed to load archive listing {}: {}", listing_url, e);
            return Ok(());
        }

        let links = match discover_archive(self.navigator.browser(), &self.layout.archive).await {
            Ok(links) => links,
            Err(e) => {
                tracing::error!("Failed to read archive listing {}: {}", listing_url, e);
                return Ok(());
            }
        };
        summary.discovered += links.len();

        for link in links {
            let outcome = self.process_archive_page(&link).await;
            record(outcome, &link, summary)?;
        }

        Ok(())
    }

    /// Visits a press release; a date breach only skips the item
    async fn process_press_release(&mut self, link: &LinkRecord) -> ItemOutcome {
        tracing::debug!("Start parse press-release from url: {}", link.url);
        if let Err(e) = self.navigator.visit(&link.url, self.layout.delays.item).await {
            return ItemOutcome::SkipItem(SkipReason::Extraction(e.into()));
        }

        let document = match extract_press_release(
            self.navigator.browser(),
            &self.layout.press_releases,
            &link.url,
        )
        .await
        {
            Ok(document) => document,
            Err(e) => return ItemOutcome::SkipItem(SkipReason::Extraction(e)),
        };

        if let Err(breach) = self.restriction.check_date(document.published) {
            return ItemOutcome::SkipItem(SkipReason::BeforeFromDate(breach));
        }

        self.submit(document)
    }

    /// Visits an archive entry; a date breach ends the run
    ///
    /// The date is known from the listing, so the check happens before
    /// navigating.
    async fn process_archive_page(&mut self, link: &LinkRecord) -> ItemOutcome {
        let Some(published) = link.published else {
            return ItemOutcome::SkipItem(SkipReason::Extraction(ExtractError::MissingElement {
                what: "archive date label",
                locator: self.layout.archive.date_label.clone(),
            }));
        };

        if let Err(breach) = self.restriction.check_date(published) {
            return ItemOutcome::StopRun(StopReason::DateBoundCrossed {
                url: link.url.clone(),
                breach,
            });
        }

        tracing::debug!("Start parse archive from url: {}", link.url);
        if let Err(e) = self.navigator.visit(&link.url, self.layout.delays.item).await {
            return ItemOutcome::SkipItem(SkipReason::Extraction(e.into()));
        }

        match extract_archive_page(
            self.navigator.browser(),
            &self.layout.archive,
            &link.url,
            published,
        )
        .await
        {
            Ok(document) => self.submit(document),
            Err(e) => ItemOutcome::SkipItem(SkipReason::Extraction(e)),
        }
    }

    fn submit(&mut self, document: Document) -> ItemOutcome {
        if self.restriction.is_last_seen(&document) {
            return ItemOutcome::StopRun(StopReason::LastSeenReached { url: document.url });
        }

        match self.intake.submit(document) {
            Ok(()) => ItemOutcome::Submitted,
            Err(IntakeError::Finish(message)) => ItemOutcome::StopRun(StopReason::Host(message)),
            Err(e) => ItemOutcome::SkipItem(SkipReason::Rejected(e)),
        }
    }
}

/// Logs an item outcome and folds it into the summary
///
/// Only `StopRun` escapes the per-item boundary.
fn record(
    outcome: ItemOutcome,
    link: &LinkRecord,
    summary: &mut RunSummary,
) -> Result<(), StopReason> {
    match outcome {
        ItemOutcome::Submitted => summary.submitted += 1,
        ItemOutcome::SkipItem(SkipReason::BeforeFromDate(breach)) => {
            tracing::info!("Skipping {}: {}", link.url, breach);
            summary.skipped += 1;
        }
        ItemOutcome::SkipItem(SkipReason::Extraction(e)) => {
            tracing::error!("Failed to parse {}: {}", link.url, e);
            summary.failed += 1;
        }
        ItemOutcome::SkipItem(SkipReason::Rejected(e)) => {
            tracing::error!("Document from {} not accepted: {}", link.url, e);
            summary.failed += 1;
        }
        ItemOutcome::StopRun(reason) => return Err(reason),
    }
    Ok(())
}
