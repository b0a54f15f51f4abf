//! Chromium-backed browser handle
//!
//! This module adapts a `chromiumoxide` DevTools session to the crawler's
//! `Browser` trait:
//! - Locators are translated to CSS where possible; XPath only at page level
//! - `attribute` reads the DOM property first, then the attribute
//! - Navigation is bounded by the configured page-load timeout
//! - Interactability is polled (rendered box and not disabled) until a deadline

use crate::browser::traits::{Browser, BrowserError, BrowserResult, Element, Locator};
use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser as CdpBrowser, BrowserConfig, Page};
use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Interval between interactability checks
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Used until `set_page_load_timeout` is called
const DEFAULT_PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(40);

const INTERACTABLE_JS: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return !this.disabled
        && rect.width > 0
        && rect.height > 0
        && style.visibility !== 'hidden'
        && style.display !== 'none';
}"#;

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        BrowserError::Command(e.to_string())
    }
}

/// A locator in the form DevTools accepts
#[derive(Debug, PartialEq, Eq)]
enum Query {
    Css(String),
    XPath(String),
}

impl Query {
    fn from_locator(locator: &Locator) -> Self {
        match locator.to_css() {
            Some(selector) => Query::Css(selector),
            None => Query::XPath(locator_expr(locator)),
        }
    }
}

fn locator_expr(locator: &Locator) -> String {
    match locator {
        Locator::Css(s)
        | Locator::Id(s)
        | Locator::ClassName(s)
        | Locator::TagName(s)
        | Locator::XPath(s) => s.clone(),
    }
}

/// Property values come back as JSON
fn property_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Browser handle backed by a Chromium DevTools session
pub struct ChromiumBrowser {
    browser: CdpBrowser,
    page: Page,
    handler: JoinHandle<()>,
    page_load_timeout: Duration,
}

impl ChromiumBrowser {
    /// Launches a local Chromium
    ///
    /// # Arguments
    ///
    /// * `headless` - Whether to run without a window
    ///
    /// # Returns
    ///
    /// * `Ok(ChromiumBrowser)` - Browser started and a blank tab opened
    /// * `Err(BrowserError)` - No usable Chromium was found or it failed to start
    pub async fn launch(headless: bool) -> BrowserResult<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Session)?;

        let (browser, handler) = CdpBrowser::launch(config)
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))?;

        tracing::debug!("Chromium launched (headless: {})", headless);
        Self::attach(browser, handler).await
    }

    /// Connects to a running Chromium's DevTools endpoint
    pub async fn connect(debugging_url: &str) -> BrowserResult<Self> {
        let (browser, handler) = CdpBrowser::connect(debugging_url)
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))?;

        tracing::debug!("Connected to Chromium at {}", debugging_url);
        Self::attach(browser, handler).await
    }

    async fn attach(
        browser: CdpBrowser,
        mut handler: chromiumoxide::Handler,
    ) -> BrowserResult<Self> {
        // The handler must be polled for any command to complete
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))?;

        Ok(Self {
            browser,
            page,
            handler,
            page_load_timeout: DEFAULT_PAGE_LOAD_TIMEOUT,
        })
    }

    /// Closes the browser and stops the event handler
    pub async fn close(mut self) -> BrowserResult<()> {
        let result = self.browser.close().await;
        self.handler.abort();
        result?;
        Ok(())
    }
}

/// Element handle inside a Chromium page
pub struct ChromiumElement {
    inner: chromiumoxide::Element,
}

impl ChromiumElement {
    fn wrap(found: Vec<chromiumoxide::Element>) -> Vec<Self> {
        found.into_iter().map(|inner| Self { inner }).collect()
    }
}

#[async_trait]
impl Element for ChromiumElement {
    async fn text(&self) -> BrowserResult<String> {
        Ok(self.inner.inner_text().await?.unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> BrowserResult<Option<String>> {
        if let Some(value) = self.inner.property(name).await?.and_then(property_string) {
            return Ok(Some(value));
        }
        Ok(self.inner.attribute(name).await?)
    }

    async fn click(&self) -> BrowserResult<()> {
        self.inner.click().await?;
        Ok(())
    }

    async fn find(&self, locator: &Locator) -> BrowserResult<Option<Self>> {
        Ok(self.find_all(locator).await?.into_iter().next())
    }

    async fn find_all(&self, locator: &Locator) -> BrowserResult<Vec<Self>> {
        match Query::from_locator(locator) {
            Query::Css(selector) => Ok(Self::wrap(self.inner.find_elements(selector).await?)),
            Query::XPath(_) => Err(BrowserError::UnsupportedLocator(format!(
                "{} inside an element",
                locator
            ))),
        }
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    type Element = ChromiumElement;

    async fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        match tokio::time::timeout(self.page_load_timeout, self.page.goto(url)).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(BrowserError::Command(format!(
                "page load exceeded {:?}",
                self.page_load_timeout
            ))),
        }
    }

    async fn set_page_load_timeout(&mut self, timeout: Duration) -> BrowserResult<()> {
        self.page_load_timeout = timeout;
        Ok(())
    }

    async fn current_url(&mut self) -> BrowserResult<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn find(&mut self, locator: &Locator) -> BrowserResult<Option<Self::Element>> {
        Ok(self.find_all(locator).await?.into_iter().next())
    }

    async fn find_all(&mut self, locator: &Locator) -> BrowserResult<Vec<Self::Element>> {
        let found = match Query::from_locator(locator) {
            Query::Css(selector) => self.page.find_elements(selector).await?,
            Query::XPath(expr) => self.page.find_xpaths(expr).await?,
        };
        Ok(ChromiumElement::wrap(found))
    }

    async fn wait_until_interactable(
        &mut self,
        element: &Self::Element,
        timeout: Duration,
    ) -> BrowserResult<bool> {
        let deadline = Instant::now() + timeout;

        loop {
            let returns = element.inner.call_js_fn(INTERACTABLE_JS, false).await?;
            if returns.result.value.and_then(|v| v.as_bool()) == Some(true) {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}
