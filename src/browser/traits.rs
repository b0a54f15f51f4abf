//! Browser handle traits and error types
//!
//! This module defines the capability interface the crawler needs from a
//! browser-automation driver. The crawler never creates a browser itself;
//! the host injects one and keeps ownership of its lifecycle.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while driving the browser
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to open browser session: {0}")]
    Session(String),

    #[error("Browser command failed: {0}")]
    Command(String),

    #[error("Unsupported locator: {0}")]
    UnsupportedLocator(String),
}

/// Result type for browser operations
pub type BrowserResult<T> = Result<T, BrowserError>;

/// How to find an element on the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    Id(String),
    ClassName(String),
    TagName(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn class_name(class: impl Into<String>) -> Self {
        Self::ClassName(class.into())
    }

    pub fn tag_name(tag: impl Into<String>) -> Self {
        Self::TagName(tag.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Expresses the locator as a CSS selector, if it has one
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Css(selector) => Some(selector.clone()),
            Self::Id(id) => Some(format!("#{}", id)),
            Self::ClassName(class) => Some(format!(".{}", class)),
            Self::TagName(tag) => Some(tag.clone()),
            Self::XPath(_) => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={}", s),
            Self::Id(s) => write!(f, "id={}", s),
            Self::ClassName(s) => write!(f, "class={}", s),
            Self::TagName(s) => write!(f, "tag={}", s),
            Self::XPath(s) => write!(f, "xpath={}", s),
        }
    }
}

/// An element handle on the current page
#[async_trait]
pub trait Element: Send + Sync + Sized {
    /// Rendered text of the element
    async fn text(&self) -> BrowserResult<String>;

    /// Property or attribute value, property first
    async fn attribute(&self, name: &str) -> BrowserResult<Option<String>>;

    /// Activates the element
    async fn click(&self) -> BrowserResult<()>;

    /// First descendant matching the locator
    async fn find(&self, locator: &Locator) -> BrowserResult<Option<Self>>;

    /// All descendants matching the locator, in document order
    async fn find_all(&self, locator: &Locator) -> BrowserResult<Vec<Self>>;
}

/// Trait for browser-automation handles
///
/// Operations are awaited one at a time; the crawler never issues two
/// commands against the same handle concurrently.
#[async_trait]
pub trait Browser: Send {
    type Element: Element;

    /// Directs the browser to a URL
    async fn navigate(&mut self, url: &str) -> BrowserResult<()>;

    /// Sets how long a navigation may take before it fails
    async fn set_page_load_timeout(&mut self, timeout: Duration) -> BrowserResult<()>;

    /// URL of the page currently loaded
    async fn current_url(&mut self) -> BrowserResult<String>;

    /// First element matching the locator, or None when nothing matches
    async fn find(&mut self, locator: &Locator) -> BrowserResult<Option<Self::Element>>;

    /// All elements matching the locator, in document order
    async fn find_all(&mut self, locator: &Locator) -> BrowserResult<Vec<Self::Element>>;

    /// Waits up to `timeout` for the element to become visible and enabled
    async fn wait_until_interactable(
        &mut self,
        element: &Self::Element,
        timeout: Duration,
    ) -> BrowserResult<bool>;
}
