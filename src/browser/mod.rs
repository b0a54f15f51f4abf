//! Browser module for driving pages the crawler reads
//!
//! This module contains:
//! - The `Browser` / `Element` capability traits the crawler is written against
//! - `Locator`, the element lookup vocabulary
//! - A Chromium (DevTools protocol) implementation for real runs

mod chromium;
mod traits;

pub use chromium::{ChromiumBrowser, ChromiumElement};
pub use traits::{Browser, BrowserError, BrowserResult, Element, Locator};
