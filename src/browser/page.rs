use super::manager::BrowserError;
use super::PageDriver;
use headless_chrome::Tab;
use std::sync::Arc;
use std::time::Duration;

/// A configured Chrome tab driven through [`PageDriver`]
pub struct BrowserPage {
    tab: Arc<Tab>,
    navigation_timeout: Duration,
    action_timeout: Duration,
}

impl BrowserPage {
    pub fn new(tab: Arc<Tab>, navigation_timeout: Duration, action_timeout: Duration) -> Self {
        Self {
            tab,
            navigation_timeout,
            action_timeout,
        }
    }

    /// Get a reference to the underlying tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }
}

impl PageDriver for BrowserPage {
    fn goto(&self, url: &str) -> Result<(), BrowserError> {
        // Page loads get the longer budget, everything else the action timeout
        self.tab.set_default_timeout(self.navigation_timeout);

        let result = self
            .tab
            .navigate_to(url)
            .map_err(|e| BrowserError::NavigationError(format!("Failed to navigate to {}: {}", url, e)))
            .and_then(|tab| {
                tab.wait_until_navigated()
                    .map_err(|e| BrowserError::NavigationError(format!("Navigation timeout for {}: {}", url, e)))
            })
            .map(|_| ());

        self.tab.set_default_timeout(self.action_timeout);
        result
    }

    fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
            .map_err(|_| BrowserError::Timeout(format!("Waiting for selector: {}", selector)))
    }

    fn evaluate(&self, script: &str, await_promise: bool) -> Result<Option<serde_json::Value>, BrowserError> {
        self.tab
            .evaluate(script, await_promise)
            .map(|result| result.value)
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))
    }

    fn content(&self) -> Result<String, BrowserError> {
        self.tab
            .get_content()
            .map_err(|e| BrowserError::HtmlExtractionError(e.to_string()))
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }
}
