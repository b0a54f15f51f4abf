//! Site layout for the Visa newsroom
//!
//! Everything page-specific lives here: listing URLs, element locators,
//! consent-button candidates and how long each kind of page needs to settle.

use crate::browser::Locator;
use std::time::Duration;

/// How long to wait after navigation before reading a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelays {
    /// Press-release listing (tabs render client-side)
    pub press_listing: Duration,

    /// Archive listing (accordion content renders client-side)
    pub archive_listing: Duration,

    /// Individual item pages
    pub item: Duration,
}

impl SettleDelays {
    /// No settling at all
    pub const fn none() -> Self {
        Self {
            press_listing: Duration::ZERO,
            archive_listing: Duration::ZERO,
            item: Duration::ZERO,
        }
    }
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            press_listing: Duration::from_secs(4),
            archive_listing: Duration::from_secs(5),
            item: Duration::from_secs(3),
        }
    }
}

/// Consent dialog handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentLayout {
    /// Candidate accept buttons, tried in order
    pub locators: Vec<Locator>,

    /// Bound on waiting for a found button to become clickable
    pub timeout: Duration,
}

impl Default for ConsentLayout {
    fn default() -> Self {
        Self {
            locators: vec![
                Locator::id("onetrust-accept-btn-handler"),
                Locator::id("accept-recommended-btn-handler"),
                Locator::css("button.onetrust-close-btn-handler"),
            ],
            timeout: Duration::from_secs(5),
        }
    }
}

/// Press-release listing and item pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PressReleaseLayout {
    pub listing_url: String,

    /// Tab panes on the listing
    pub section: Locator,

    /// Item anchors inside a tab pane
    pub anchor: Locator,

    pub title: Locator,
    pub date: Locator,
    pub body: Locator,
}

/// Archive listing and item pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    pub listing_url: String,

    /// Accordion panels on the listing
    pub container: Locator,

    /// Entries inside a panel
    pub section: Locator,

    /// Item anchor inside an entry
    pub anchor: Locator,

    /// Date label next to the anchor
    pub date_label: Locator,

    pub title: Locator,
    pub body: Locator,

    /// Only links whose path ends with this are item pages
    pub page_extension: String,
}

/// Complete description of the target site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteLayout {
    pub host: String,
    pub press_releases: PressReleaseLayout,
    pub archive: ArchiveLayout,
    pub consent: ConsentLayout,
    pub page_load_timeout: Duration,
    pub delays: SettleDelays,
}

const PRESS_LISTING_URL: &str =
    "https://usa.visa.com/about-visa/newsroom/press-releases-listing.html#2a";

const ARCHIVE_LISTING_URL: &str = concat!(
    "https://usa.visa.com/partner-with-us/visa-consulting-analytics/",
    "leverage-economic-and-business-insights/archives.html"
);

const ARCHIVE_TITLE_SELECTOR: &str = concat!(
    "#skipTo > div:nth-of-type(1) > div > div:nth-of-type(1) > ",
    "div:nth-of-type(2) > div > h1"
);

impl SiteLayout {
    /// Layout of usa.visa.com
    pub fn visa() -> Self {
        Self {
            host: "https://usa.visa.com".to_string(),
            press_releases: PressReleaseLayout {
                listing_url: PRESS_LISTING_URL.to_string(),
                section: Locator::class_name("tab-pane"),
                anchor: Locator::tag_name("a"),
                title: Locator::css("#response1 > div:nth-of-type(1) > h1"),
                date: Locator::css("#response1 > div:nth-of-type(1) > p"),
                body: Locator::class_name("press-release-body"),
            },
            archive: ArchiveLayout {
                listing_url: ARCHIVE_LISTING_URL.to_string(),
                container: Locator::class_name("vs-accordion-content"),
                section: Locator::class_name("section"),
                anchor: Locator::tag_name("a"),
                date_label: Locator::tag_name("span"),
                title: Locator::css(ARCHIVE_TITLE_SELECTOR),
                body: Locator::class_name("vs-page-section"),
                page_extension: ".html".to_string(),
            },
            consent: ConsentLayout::default(),
            page_load_timeout: Duration::from_secs(40),
            delays: SettleDelays::default(),
        }
    }

    pub fn with_delays(mut self, delays: SettleDelays) -> Self {
        self.delays = delays;
        self
    }

    pub fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    pub fn with_consent_timeout(mut self, timeout: Duration) -> Self {
        self.consent.timeout = timeout;
        self
    }
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self::visa()
    }
}
