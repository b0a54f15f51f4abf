//! Integration tests for the crawl controller
//!
//! These tests drive the controller over a scripted fake browser and
//! check what reaches the intake, what gets visited and what is logged.

#[path = "../common/mod.rs"]
mod common;

use chrono::{DateTime, TimeZone, Utc};
use common::{test_layout, CapturedLogs, FakeBrowser, FinishOnNth};
use std::time::Duration;
use tracing::Level;
use visa_harvest::crawler::{PageNavigator, RunState};
use visa_harvest::intake::{CollectingIntake, Intake, SqliteIntake};
use visa_harvest::{
    CrawlController, ParserError, PluginDescriptor, Restriction, RunSummary, SourceRef,
    StopReason,
};

const PRESS: &str = "https://usa.visa.com/about-visa/newsroom/press-releases.releaseId.";
const ARCHIVE_HOST: &str = "https://usa.visa.com";

fn press_url(id: u32) -> String {
    format!("{}{}.html", PRESS, id)
}

fn archive_url(path: &str) -> String {
    format!("{}{}", ARCHIVE_HOST, path)
}

fn jan_first_2024() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

async fn crawl<I: Intake>(
    browser: &mut FakeBrowser,
    restriction: Restriction,
    intake: I,
) -> (Result<RunSummary, ParserError>, I) {
    let mut controller = CrawlController::new(
        SourceRef::source("visa"),
        PluginDescriptor::visa(),
        restriction,
        browser,
        intake,
    )
    .with_layout(test_layout());
    let result = controller.run().await;
    (result, controller.into_intake())
}

async fn crawl_unrestricted(
    browser: &mut FakeBrowser,
) -> (Result<RunSummary, ParserError>, CollectingIntake) {
    crawl(browser, Restriction::unrestricted(), CollectingIntake::new()).await
}

#[tokio::test]
async fn test_press_release_before_from_date_is_skipped() {
    let (logs, _guard) = CapturedLogs::install();
    let (p1, p2, p3) = (press_url(1), press_url(2), press_url(3));
    let mut browser = FakeBrowser::new(&test_layout())
        .with_press_listing(&[&p1, &p2, &p3])
        .with_press_release(&p1, Some("Visa launches A"), "March 1, 2024", "Body A")
        .with_press_release(&p2, Some("Visa launches B"), "December 15, 2023", "Body B")
        .with_press_release(&p3, Some("Visa launches C"), "Feb. 2nd, 2024", "Body C");

    let restriction = Restriction::unrestricted().with_from_date(jan_first_2024());
    let (result, intake) = crawl(&mut browser, restriction, CollectingIntake::new()).await;

    let summary = result.unwrap();
    assert_eq!(summary.discovered, 3);
    assert_eq!(summary.submitted, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);

    let urls: Vec<_> = intake.documents().iter().map(|d| d.url.clone()).collect();
    assert_eq!(urls, vec![p1, p3.clone()]);
    assert!(intake
        .documents()
        .iter()
        .all(|d| d.published >= jan_first_2024()));

    // Skipping a press release does not end the traversal
    assert!(browser.navigations().contains(&p3));
    assert_eq!(logs.count(Level::INFO, "before from_date"), 1);
}

#[tokio::test]
async fn test_archive_date_bound_stops_run() {
    let (a, b, c, d) = (
        archive_url("/insights/a.html"),
        archive_url("/insights/b.html"),
        archive_url("/insights/c.html"),
        archive_url("/insights/d.html"),
    );
    let mut browser = FakeBrowser::new(&test_layout())
        .with_archive_listing(&[
            ("/insights/a.html", "March 2024"),
            ("/insights/b.html", "February 10, 2024"),
            ("/insights/c.html", "November 2023"),
            ("/insights/d.html", "May 2024"),
        ])
        .with_archive_page(&a, "Spending Momentum A", "Report A")
        .with_archive_page(&b, "Spending Momentum B", "Report B")
        .with_archive_page(&c, "Spending Momentum C", "Report C")
        .with_archive_page(&d, "Spending Momentum D", "Report D");

    let restriction = Restriction::unrestricted().with_from_date(jan_first_2024());
    let mut controller = CrawlController::new(
        SourceRef::source("visa"),
        PluginDescriptor::visa(),
        restriction,
        &mut browser,
        CollectingIntake::new(),
    )
    .with_layout(test_layout());

    let result = controller.run().await;
    assert_eq!(controller.state(), RunState::FinishedEarly);

    match result {
        Err(ParserError::Finish(StopReason::DateBoundCrossed { url, breach })) => {
            assert_eq!(url, c);
            assert_eq!(breach.bound, jan_first_2024());
        }
        other => panic!("expected date bound stop, got {:?}", other),
    }

    let intake = controller.into_intake();
    let urls: Vec<_> = intake.documents().iter().map(|d| d.url.clone()).collect();
    assert_eq!(urls, vec![a, b]);

    // The breaching item and everything after it are never visited
    let navigations = browser.navigations();
    assert!(!navigations.contains(&c));
    assert!(!navigations.contains(&d));
}

#[tokio::test]
async fn test_host_finish_on_kth_submission() {
    let urls: Vec<String> = (1..=4).map(press_url).collect();
    let mut browser = FakeBrowser::new(&test_layout()).with_press_listing(&urls);
    for (i, url) in urls.iter().enumerate() {
        let title = format!("Release {}", i);
        browser = browser.with_press_release(
            url,
            Some(title.as_str()),
            "April 3, 2024",
            "Body",
        );
    }

    let intake = FinishOnNth::new(3);
    let (result, intake) = crawl(&mut browser, Restriction::unrestricted(), intake).await;

    assert!(matches!(
        result,
        Err(ParserError::Finish(StopReason::Host(_)))
    ));
    assert_eq!(intake.calls, 3);
    assert_eq!(intake.accepted.len(), 2);

    let navigations = browser.navigations();
    assert_eq!(navigations.last(), Some(&urls[2]));
    assert!(!navigations.contains(&urls[3]));
    assert!(!navigations.contains(&test_layout().archive.listing_url));
}

#[tokio::test]
async fn test_empty_listings_complete_without_errors() {
    let (logs, _guard) = CapturedLogs::install();
    let layout = test_layout();
    let mut browser = FakeBrowser::new(&layout);

    let mut controller = CrawlController::new(
        SourceRef::source("visa"),
        PluginDescriptor::visa(),
        Restriction::unrestricted(),
        &mut browser,
        CollectingIntake::new(),
    )
    .with_layout(layout.clone());

    let summary = controller.run().await.unwrap();
    assert_eq!(summary, RunSummary::default());
    assert_eq!(controller.state(), RunState::Done);
    assert!(controller.intake().documents().is_empty());

    assert_eq!(
        browser.navigations(),
        vec![
            layout.press_releases.listing_url.clone(),
            layout.archive.listing_url.clone()
        ]
    );
    assert!(logs.at(Level::ERROR).is_empty());
}

#[tokio::test]
async fn test_missing_title_fails_one_item_only() {
    let (logs, _guard) = CapturedLogs::install();
    let (p1, p2, p3) = (press_url(1), press_url(2), press_url(3));
    let mut browser = FakeBrowser::new(&test_layout())
        .with_press_listing(&[&p1, &p2, &p3])
        .with_press_release(&p1, Some("First"), "May 1, 2024", "Body 1")
        .with_press_release(&p2, None, "May 2, 2024", "Body 2")
        .with_press_release(&p3, Some("Third"), "May 3, 2024", "Body 3");

    let (result, intake) = crawl_unrestricted(&mut browser).await;

    let summary = result.unwrap();
    assert_eq!(summary.submitted, 2);
    assert_eq!(summary.failed, 1);

    let titles: Vec<_> = intake.documents().iter().map(|d| d.title.clone()).collect();
    assert_eq!(titles, vec!["First", "Third"]);

    let errors = logs.at(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains(&p2));
}

#[tokio::test]
async fn test_consent_miss_logs_once() {
    let (logs, _guard) = CapturedLogs::install();
    let layout = test_layout();
    let url = press_url(7);
    let mut browser =
        FakeBrowser::new(&layout).with_press_release(&url, Some("T"), "May 1, 2024", "B");

    let mut navigator = PageNavigator::new(&mut browser, layout.consent.clone());
    navigator.visit(&url, Duration::ZERO).await.unwrap();

    assert_eq!(logs.count(Level::DEBUG, "consent"), 1);
    assert_eq!(logs.count(Level::DEBUG, "not found"), 1);
    assert!(browser.clicks().is_empty());
}

#[tokio::test]
async fn test_consent_button_is_clicked() {
    let (logs, _guard) = CapturedLogs::install();
    let layout = test_layout();
    let url = press_url(8);
    let mut browser = FakeBrowser::new(&layout).with_consent_button(&url);

    let mut navigator = PageNavigator::new(&mut browser, layout.consent.clone());
    navigator.visit(&url, Duration::ZERO).await.unwrap();

    assert_eq!(browser.clicks(), vec!["consent"]);
    assert_eq!(logs.count(Level::DEBUG, "not found"), 0);
}

#[tokio::test]
async fn test_consent_dismissed_on_every_visit() {
    let layout = test_layout();
    let (p1, p2) = (press_url(1), press_url(2));
    let report = archive_url("/insights/report.html");
    let mut browser = FakeBrowser::new(&layout)
        .with_press_listing(&[&p1, &p2])
        .with_press_release(&p1, Some("One"), "May 1, 2024", "Body 1")
        .with_press_release(&p2, Some("Two"), "May 2, 2024", "Body 2")
        .with_archive_listing(&[("/insights/report.html", "March 2024")])
        .with_archive_page(&report, "Report", "Report body");
    for url in [
        &layout.press_releases.listing_url,
        &layout.archive.listing_url,
        &p1,
        &p2,
        &report,
    ] {
        browser = browser.with_consent_button(url);
    }

    let (result, _) = crawl_unrestricted(&mut browser).await;

    assert_eq!(result.unwrap().submitted, 3);
    let navigations = browser.navigations();
    assert_eq!(navigations.len(), 5);
    assert_eq!(browser.clicks().len(), navigations.len());
}

#[tokio::test]
async fn test_unparsable_press_release_date_fails_one_item_only() {
    let (logs, _guard) = CapturedLogs::install();
    let (p1, p2) = (press_url(1), press_url(2));
    let mut browser = FakeBrowser::new(&test_layout())
        .with_press_listing(&[&p1, &p2])
        .with_press_release(&p1, Some("Undated"), "Coming soon", "Body 1")
        .with_press_release(&p2, Some("Dated"), "May 2, 2024", "Body 2");

    let (result, intake) = crawl_unrestricted(&mut browser).await;

    let summary = result.unwrap();
    assert_eq!(summary.submitted, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(intake.documents()[0].url, p2);

    let errors = logs.at(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains(&p1));
}

#[tokio::test]
async fn test_unparsable_archive_label_is_skipped_before_visiting() {
    let (logs, _guard) = CapturedLogs::install();
    let a = archive_url("/insights/a.html");
    let b = archive_url("/insights/b.html");
    let mut browser = FakeBrowser::new(&test_layout())
        .with_archive_listing(&[
            ("/insights/a.html", "Q3 results"),
            ("/insights/b.html", "March 2024"),
        ])
        .with_archive_page(&a, "Report A", "Body A")
        .with_archive_page(&b, "Report B", "Body B");

    let (result, intake) = crawl_unrestricted(&mut browser).await;

    let summary = result.unwrap();
    assert_eq!(summary.discovered, 1);
    assert_eq!(summary.submitted, 1);
    assert_eq!(intake.documents()[0].url, b);
    assert!(!browser.navigations().contains(&a));
    assert_eq!(logs.at(Level::ERROR).len(), 1);
    assert_eq!(logs.count(Level::ERROR, "Q3 results"), 1);
}

#[tokio::test]
async fn test_archive_entry_without_link_is_skipped() {
    let (logs, _guard) = CapturedLogs::install();
    let report = archive_url("/insights/report.html");
    let mut browser = FakeBrowser::new(&test_layout())
        .with_archive_listing(&[("/insights/report.html", "March 2024")])
        .with_unlinked_archive_entry("April 2024")
        .with_archive_page(&report, "Report", "Report body");

    let (result, intake) = crawl_unrestricted(&mut browser).await;

    let summary = result.unwrap();
    assert_eq!(summary.discovered, 1);
    assert_eq!(summary.submitted, 1);
    assert_eq!(intake.documents()[0].url, report);
    assert_eq!(logs.at(Level::ERROR).len(), 1);
    assert_eq!(logs.count(Level::ERROR, "archive link not found"), 1);
}

#[tokio::test]
async fn test_navigation_failure_fails_one_item_only() {
    let (logs, _guard) = CapturedLogs::install();
    let (p1, p2, p3) = (press_url(1), press_url(2), press_url(3));
    let mut browser = FakeBrowser::new(&test_layout())
        .with_press_listing(&[&p1, &p2, &p3])
        .with_press_release(&p1, Some("First"), "May 1, 2024", "Body 1")
        .with_press_release(&p2, Some("Second"), "May 2, 2024", "Body 2")
        .with_press_release(&p3, Some("Third"), "May 3, 2024", "Body 3")
        .with_navigation_failure(&p2);

    let (result, intake) = crawl_unrestricted(&mut browser).await;

    let summary = result.unwrap();
    assert_eq!(summary.submitted, 2);
    assert_eq!(summary.failed, 1);

    // The page left over from the first release must not be stored again
    let urls: Vec<_> = intake.documents().iter().map(|d| d.url.clone()).collect();
    assert_eq!(urls, vec![p1, p3]);

    let errors = logs.at(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains(&p2));
}

#[tokio::test]
async fn test_plugin_descriptor_is_logged_once() {
    let (logs, _guard) = CapturedLogs::install();
    let mut browser = FakeBrowser::new(&test_layout());

    let (result, _) = crawl_unrestricted(&mut browser).await;

    assert!(result.is_ok());
    let plugin = PluginDescriptor::visa();
    assert_eq!(logs.count(Level::DEBUG, &plugin.entry), 1);
    assert_eq!(logs.count(Level::DEBUG, &plugin.files[0]), 1);
}

#[tokio::test]
async fn test_non_page_archive_links_are_never_visited() {
    let pdf = archive_url("/dam/VCA/spending-report.pdf");
    let page = archive_url("/insights/report.html");
    let mut browser = FakeBrowser::new(&test_layout())
        .with_archive_listing(&[
            ("/dam/VCA/spending-report.pdf", "March 2024"),
            ("/insights/report.html", "March 2024"),
        ])
        .with_archive_page(&page, "Report", "Report body");

    let (result, intake) = crawl_unrestricted(&mut browser).await;

    let summary = result.unwrap();
    assert_eq!(summary.discovered, 1);
    assert_eq!(summary.submitted, 1);
    assert_eq!(intake.documents()[0].url, page);
    assert!(!browser.navigations().contains(&pdf));
}

#[tokio::test]
async fn test_duplicate_listing_links_are_visited_once() {
    let p1 = press_url(1);
    let mut browser = FakeBrowser::new(&test_layout())
        .with_press_listing(&[&p1, &p1])
        .with_press_release(&p1, Some("Once"), "May 1, 2024", "Body");

    let (result, _) = crawl_unrestricted(&mut browser).await;

    assert_eq!(result.unwrap().submitted, 1);
    let visits = browser.navigations().iter().filter(|u| **u == p1).count();
    assert_eq!(visits, 1);
}

#[tokio::test]
async fn test_rerun_stops_at_last_seen_document() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("visa.db");
    let (p0, p1, p2) = (press_url(10), press_url(11), press_url(12));

    // First run stores two releases
    {
        let mut intake = SqliteIntake::open(&db, "visa").unwrap();
        let mut browser = FakeBrowser::new(&test_layout())
            .with_press_listing(&[&p1, &p2])
            .with_press_release(&p1, Some("Eleven"), "March 1, 2024", "Body 11")
            .with_press_release(&p2, Some("Twelve"), "February 1, 2024", "Body 12");

        let (result, _) = crawl(&mut browser, Restriction::unrestricted(), &mut intake).await;
        assert_eq!(result.unwrap().submitted, 2);
    }

    // Second run sees one new release on top
    let mut intake = SqliteIntake::open(&db, "visa").unwrap();
    let last = intake.latest_document().unwrap().unwrap();
    assert_eq!(last.url, p1);

    let mut browser = FakeBrowser::new(&test_layout())
        .with_press_listing(&[&p0, &p1, &p2])
        .with_press_release(&p0, Some("Ten"), "April 1, 2024", "Body 10")
        .with_press_release(&p1, Some("Eleven"), "March 1, 2024", "Body 11")
        .with_press_release(&p2, Some("Twelve"), "February 1, 2024", "Body 12");

    let restriction = Restriction::unrestricted().with_last_seen(last);
    let (result, _) = crawl(&mut browser, restriction, &mut intake).await;

    match result {
        Err(ParserError::Finish(StopReason::LastSeenReached { url })) => assert_eq!(url, p1),
        other => panic!("expected last-seen stop, got {:?}", other),
    }
    assert_eq!(intake.accepted(), 1);
    assert_eq!(intake.count_documents().unwrap(), 3);
    assert!(!browser.navigations().contains(&p2));
}

#[tokio::test]
async fn test_already_stored_document_finishes_run() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("visa.db");
    let p1 = press_url(21);
    let p2 = press_url(22);

    let script = |browser: FakeBrowser| {
        browser
            .with_press_listing(&[&p1, &p2])
            .with_press_release(&p1, Some("One"), "June 1, 2024", "Body 1")
            .with_press_release(&p2, Some("Two"), "May 1, 2024", "Body 2")
    };

    let mut intake = SqliteIntake::open(&db, "visa").unwrap();
    let mut browser = script(FakeBrowser::new(&test_layout()));
    let (first, _) = crawl(&mut browser, Restriction::unrestricted(), &mut intake).await;
    assert_eq!(first.unwrap().submitted, 2);

    let mut browser = script(FakeBrowser::new(&test_layout()));
    let (second, _) = crawl(&mut browser, Restriction::unrestricted(), &mut intake).await;

    assert!(matches!(
        second,
        Err(ParserError::Finish(StopReason::Host(_)))
    ));
    assert_eq!(intake.count_documents().unwrap(), 2);
    assert!(!browser.navigations().contains(&p2));
}

#[tokio::test]
async fn test_max_materials_enforced_by_intake() {
    let dir = tempfile::tempdir().unwrap();
    let urls: Vec<String> = (31..=33).map(press_url).collect();
    let mut browser = FakeBrowser::new(&test_layout()).with_press_listing(&urls);
    for url in &urls {
        browser = browser.with_press_release(url, Some("Release"), "July 4, 2024", "Body");
    }

    let mut intake = SqliteIntake::open(&dir.path().join("visa.db"), "visa")
        .unwrap()
        .with_max_materials(Some(2));

    let (result, _) = crawl(&mut browser, Restriction::unrestricted(), &mut intake).await;

    assert!(matches!(
        result,
        Err(ParserError::Finish(StopReason::Host(_)))
    ));
    assert_eq!(intake.count_documents().unwrap(), 2);
}
