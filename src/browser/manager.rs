use super::config::BrowserConfig;
use super::intercept::ResourceFilter;
use super::page::BrowserPage;
use headless_chrome::protocol::cdp::Emulation;
use headless_chrome::types::Bounds;
use headless_chrome::{Browser, LaunchOptions};
use std::ffi::OsStr;
use std::sync::Arc;

/// Owns the Chrome process and hands out configured pages
pub struct BrowserManager {
    browser: Arc<Browser>,
    config: BrowserConfig,
}

impl BrowserManager {
    /// Launch Chrome with the given configuration
    pub fn new(config: BrowserConfig) -> Result<Self, BrowserError> {
        let args = config.launch_args();
        let launch_options = Self::build_launch_options(&config, &args)?;

        let browser = Browser::new(launch_options)
            .map_err(|e| BrowserError::InitializationError(e.to_string()))?;

        log::info!(
            "Chromium launched (headless: {}, viewport: {}x{})",
            config.headless,
            config.window_size.0,
            config.window_size.1
        );

        Ok(Self {
            browser: Arc::new(browser),
            config,
        })
    }

    /// Build Chrome launch options; `args` must outlive the options
    fn build_launch_options<'a>(
        config: &BrowserConfig,
        args: &'a [String],
    ) -> Result<LaunchOptions<'a>, BrowserError> {
        let os_args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();

        LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_size.0, config.window_size.1)))
            .args(os_args)
            .build()
            .map_err(|e| BrowserError::ConfigurationError(e.to_string()))
    }

    /// Open a page with the fixed identity, viewport, timeouts and resource
    /// filter. The filter stays active for the page's lifetime.
    pub fn new_page(&self) -> Result<BrowserPage, BrowserError> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| BrowserError::TabCreationError(e.to_string()))?;

        tab.set_user_agent(&self.config.user_agent, Some(&self.config.accept_language), None)
            .map_err(|e| BrowserError::ConfigurationError(format!("User agent: {}", e)))?;

        tab.set_bounds(Bounds::Normal {
            left: Some(0),
            top: Some(0),
            width: Some(self.config.window_size.0 as f64),
            height: Some(self.config.window_size.1 as f64),
        })
        .map_err(|e| BrowserError::ConfigurationError(format!("Viewport: {}", e)))?;

        tab.call_method(Emulation::SetScriptExecutionDisabled { value: false })
            .map_err(|e| BrowserError::ConfigurationError(format!("JavaScript: {}", e)))?;

        tab.set_default_timeout(self.config.action_timeout);

        ResourceFilter::new(&self.config.blocked_resource_types).install(&tab)?;

        Ok(BrowserPage::new(
            tab,
            self.config.navigation_timeout,
            self.config.action_timeout,
        ))
    }

    /// Get the browser configuration
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }
}

impl Drop for BrowserManager {
    fn drop(&mut self) {
        // Chrome is killed when the last `Browser` handle goes away
        log::info!("Browser closed.");
    }
}

/// Errors that can occur during browser operations
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("Browser initialization failed: {0}")]
    InitializationError(String),

    #[error("Browser configuration error: {0}")]
    ConfigurationError(String),

    #[error("Tab creation failed: {0}")]
    TabCreationError(String),

    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("JavaScript execution error: {0}")]
    JavaScriptError(String),

    #[error("HTML extraction error: {0}")]
    HtmlExtractionError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_options_build() {
        let config = BrowserConfig::default();
        let args = config.launch_args();
        let options = BrowserManager::build_launch_options(&config, &args).unwrap();

        assert!(options.headless);
        assert!(options
            .args
            .iter()
            .any(|arg| arg.to_string_lossy().contains("AutomationControlled")));
        assert!(options
            .args
            .iter()
            .any(|arg| arg.to_string_lossy().starts_with("--user-agent=")));
    }

    #[test]
    #[ignore] // Requires Chrome to be installed
    fn test_new_page() {
        let manager = BrowserManager::new(BrowserConfig::default()).unwrap();
        assert!(manager.new_page().is_ok());
    }
}
