//! Browser automation for the JavaScript-rendered site
//!
//! Extraction code never touches Chrome directly. It drives a [`PageDriver`],
//! which [`BrowserPage`] implements on top of a headless Chrome tab.
//!
//! # Example
//!
//! ```no_run
//! use manhwa_scraper::browser::{BrowserConfig, BrowserManager, Navigator, PageDriver};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = BrowserManager::new(BrowserConfig::default())?;
//! let page = manager.new_page()?;
//!
//! let navigator = Navigator::new(3, Duration::from_secs(3));
//! if navigator.navigate(&page, "https://asuracomic.net") {
//!     let html = page.content()?;
//!     println!("Extracted {} bytes of HTML", html.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod intercept;
pub mod manager;
pub mod navigator;
pub mod page;
pub mod scroll;

pub use config::BrowserConfig;
pub use intercept::ResourceFilter;
pub use manager::{BrowserError, BrowserManager};
pub use navigator::{navigate, Navigator};
pub use page::BrowserPage;
pub use scroll::ScrollTrigger;

use std::time::Duration;

/// The operations the extractors need from a loaded page
pub trait PageDriver {
    /// Load `url` and wait for the document to finish loading
    fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// Wait until an element matching `selector` exists
    fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Run a script in the page, optionally awaiting the promise it returns
    fn evaluate(&self, script: &str, await_promise: bool) -> Result<Option<serde_json::Value>, BrowserError>;

    /// Serialized DOM of the current document
    fn content(&self) -> Result<String, BrowserError>;

    fn current_url(&self) -> String;
}

impl<T: PageDriver + ?Sized> PageDriver for &T {
    fn goto(&self, url: &str) -> Result<(), BrowserError> {
        (**self).goto(url)
    }

    fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        (**self).wait_for_selector(selector, timeout)
    }

    fn evaluate(&self, script: &str, await_promise: bool) -> Result<Option<serde_json::Value>, BrowserError> {
        (**self).evaluate(script, await_promise)
    }

    fn content(&self) -> Result<String, BrowserError> {
        (**self).content()
    }

    fn current_url(&self) -> String {
        (**self).current_url()
    }
}
