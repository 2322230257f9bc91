//! Asura Scans (`asuracomic.net`), a Next.js site rendered client-side

mod listings;
mod panels;

pub use listings::{parse_chapter_list, parse_latest_updates, parse_popular};
pub use panels::{chapter_identity, parse_panels, PanelScan};

use crate::browser::{Navigator, PageDriver, ScrollTrigger};
use crate::config::{Config, TimingConfig};
use crate::metrics::ScrapeMetrics;
use std::thread;
use std::time::Duration;

/// Scrapes listings and chapter panels through a single page
pub struct AsuraScraper<P: PageDriver> {
    page: P,
    base_url: String,
    navigator: Navigator,
    scroll: ScrollTrigger,
    timings: TimingConfig,
    metrics: ScrapeMetrics,
}

impl<P: PageDriver> AsuraScraper<P> {
    pub fn new(page: P, config: &Config, metrics: ScrapeMetrics) -> Self {
        Self {
            page,
            base_url: config.site.base_url.trim_end_matches('/').to_string(),
            navigator: Navigator::from(&config.navigation),
            scroll: ScrollTrigger::from(&config.timings),
            timings: config.timings.clone(),
            metrics,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn metrics(&self) -> &ScrapeMetrics {
        &self.metrics
    }

    fn settle(&self, millis: u64) {
        if millis > 0 {
            thread::sleep(Duration::from_millis(millis));
        }
    }

    /// Navigate through the retrying navigator, recording a failure against `operation`
    fn open(&self, operation: &str, url: &str) -> bool {
        if self.navigator.navigate(&self.page, url) {
            true
        } else {
            self.metrics.record_navigation_failure(operation, url);
            false
        }
    }

    /// Current DOM, or `None` when Chrome could not serialize it
    fn snapshot(&self, operation: &str) -> Option<String> {
        match self.page.content() {
            Ok(html) => Some(html),
            Err(e) => {
                log::warn!("[{}] Could not read page content: {}", operation, e);
                None
            }
        }
    }
}
