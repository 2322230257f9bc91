use super::PageDriver;
use crate::config::NavigationConfig;
use std::thread;
use std::time::Duration;

/// Loads pages with a bounded number of attempts and a fixed pause between them
#[derive(Debug, Clone)]
pub struct Navigator {
    retries: u32,
    backoff: Duration,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::from(&NavigationConfig::default())
    }
}

impl From<&NavigationConfig> for Navigator {
    fn from(config: &NavigationConfig) -> Self {
        Self::new(config.retries, config.backoff())
    }
}

impl Navigator {
    pub fn new(retries: u32, backoff: Duration) -> Self {
        Self {
            retries: retries.max(1),
            backoff,
        }
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Returns `false` only once every attempt has failed
    pub fn navigate<P: PageDriver + ?Sized>(&self, page: &P, url: &str) -> bool {
        for attempt in 1..=self.retries {
            match page.goto(url) {
                Ok(()) => {
                    log::debug!("Loaded {} (attempt {}/{})", url, attempt, self.retries);
                    return true;
                }
                Err(e) => {
                    log::warn!("Attempt {}/{} failed: {}", attempt, self.retries, e);
                    if attempt < self.retries {
                        thread::sleep(self.backoff);
                    }
                }
            }
        }

        log::warn!("Giving up on {} after {} attempts", url, self.retries);
        false
    }
}

/// [`Navigator::navigate`] with the default backoff
pub fn navigate<P: PageDriver + ?Sized>(page: &P, url: &str, retries: u32) -> bool {
    Navigator::new(retries, NavigationConfig::default().backoff()).navigate(page, url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserError;
    use std::cell::Cell;

    struct FlakyPage {
        failures_left: Cell<u32>,
        calls: Cell<u32>,
    }

    impl FlakyPage {
        fn failing(times: u32) -> Self {
            Self {
                failures_left: Cell::new(times),
                calls: Cell::new(0),
            }
        }
    }

    impl PageDriver for FlakyPage {
        fn goto(&self, url: &str) -> Result<(), BrowserError> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(BrowserError::NavigationError(format!("net::ERR_TIMED_OUT at {}", url)));
            }
            Ok(())
        }

        fn wait_for_selector(&self, _selector: &str, _timeout: Duration) -> Result<(), BrowserError> {
            Ok(())
        }

        fn evaluate(&self, _script: &str, _await_promise: bool) -> Result<Option<serde_json::Value>, BrowserError> {
            Ok(None)
        }

        fn content(&self) -> Result<String, BrowserError> {
            Ok(String::new())
        }

        fn current_url(&self) -> String {
            String::new()
        }
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let page = FlakyPage::failing(2);
        let navigator = Navigator::new(3, Duration::ZERO);

        assert!(navigator.navigate(&page, "https://asuracomic.net"));
        assert_eq!(page.calls.get(), 3);
    }

    #[test]
    fn test_gives_up_after_all_retries() {
        let page = FlakyPage::failing(10);
        let navigator = Navigator::new(3, Duration::ZERO);

        assert!(!navigator.navigate(&page, "https://asuracomic.net"));
        assert_eq!(page.calls.get(), 3);
    }

    #[test]
    fn test_free_function_loads_healthy_page() {
        let page = FlakyPage::failing(0);
        assert!(navigate(&page, "https://asuracomic.net", 3));
        assert_eq!(page.calls.get(), 1);
    }

    #[test]
    fn test_zero_retries_still_tries_once() {
        let page = FlakyPage::failing(0);
        assert!(Navigator::new(0, Duration::ZERO).navigate(&page, "https://asuracomic.net"));
        assert_eq!(page.calls.get(), 1);
    }
}
