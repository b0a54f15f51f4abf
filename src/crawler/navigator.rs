//! Page navigator
//!
//! Wraps the browser handle so that "go to URL, let it settle, clear the
//! consent dialog" is a single step taken before every extraction.

use crate::browser::{Browser, BrowserResult, Element};
use crate::crawler::site::ConsentLayout;
use std::time::Duration;

/// Navigator over an injected browser handle
pub struct PageNavigator<'a, B: Browser> {
    browser: &'a mut B,
    consent: ConsentLayout,
}

impl<'a, B: Browser> PageNavigator<'a, B> {
    pub fn new(browser: &'a mut B, consent: ConsentLayout) -> Self {
        Self { browser, consent }
    }

    /// The underlying browser handle, for element lookups
    pub fn browser(&mut self) -> &mut B {
        self.browser
    }

    pub fn set_consent(&mut self, consent: ConsentLayout) {
        self.consent = consent;
    }

    /// Navigates, waits `settle`, then tries to dismiss the consent dialog
    ///
    /// A failed navigation returns early; the page still holds whatever was
    /// loaded before, so nothing may be read from it.
    pub async fn visit(&mut self, url: &str, settle: Duration) -> BrowserResult<()> {
        self.browser.navigate(url).await?;
        tracing::debug!("Entered on web page {}", url);

        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        self.dismiss_consent().await;
        Ok(())
    }

    /// Clicks the first consent button that can be found
    ///
    /// Locators are tried in priority order; the first one that resolves
    /// ends the search whether or not the click succeeds.
    ///
    /// # Returns
    ///
    /// `true` if a consent button was clicked
    pub async fn dismiss_consent(&mut self) -> bool {
        for locator in &self.consent.locators {
            let button = match self.browser.find(locator).await {
                Ok(Some(button)) => button,
                Ok(None) => continue,
                Err(e) => {
                    tracing::trace!("Consent lookup {} failed: {}", locator, e);
                    continue;
                }
            };

            return match self
                .browser
                .wait_until_interactable(&button, self.consent.timeout)
                .await
            {
                Ok(true) => match button.click().await {
                    Ok(()) => {
                        tracing::debug!("Parser pass consent modal via {}", locator);
                        true
                    }
                    Err(e) => {
                        tracing::debug!("Consent button {} click failed: {}", locator, e);
                        false
                    }
                },
                Ok(false) => {
                    tracing::debug!(
                        "Consent button {} not clickable within {:?}",
                        locator,
                        self.consent.timeout
                    );
                    false
                }
                Err(e) => {
                    tracing::debug!("Consent button {} wait failed: {}", locator, e);
                    false
                }
            };
        }

        let page = self
            .browser
            .current_url()
            .await
            .unwrap_or_else(|_| "<unknown>".to_string());
        tracing::debug!("Modal consent agree not found on page: {}", page);
        false
    }
}
