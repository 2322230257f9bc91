use crate::config::{BrowserSettings, DEFAULT_USER_AGENT};
use std::time::Duration;

/// Configuration for the Chrome instance and the pages it opens
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,

    /// Browser window and page viewport size
    pub window_size: (u32, u32),

    /// User agent presented by every page
    pub user_agent: String,

    /// Accept-Language sent alongside the user agent
    pub accept_language: String,

    /// Timeout for a page load
    pub navigation_timeout: Duration,

    /// Default timeout for element waits and other tab actions
    pub action_timeout: Duration,

    /// CDP resource types (`font`, `media`, ...) the page refuses to load
    pub blocked_resource_types: Vec<String>,

    /// Additional Chrome flags
    pub chrome_flags: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self::from(&BrowserSettings::default())
    }
}

impl From<&BrowserSettings> for BrowserConfig {
    fn from(settings: &BrowserSettings) -> Self {
        let user_agent = if settings.user_agent.trim().is_empty() {
            DEFAULT_USER_AGENT.to_string()
        } else {
            settings.user_agent.clone()
        };

        Self {
            headless: settings.headless,
            window_size: (settings.window_width, settings.window_height),
            user_agent,
            accept_language: settings.accept_language.clone(),
            navigation_timeout: Duration::from_secs(settings.navigation_timeout_secs),
            action_timeout: Duration::from_secs(settings.action_timeout_secs),
            blocked_resource_types: settings
                .blocked_resource_types
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            chrome_flags: settings.chrome_flags.clone(),
        }
    }
}

impl BrowserConfig {
    /// Create a configuration for debugging (visible browser window)
    pub fn debug_mode() -> Self {
        let mut config = Self::default();
        config.headless = false;
        config
    }

    /// Chrome command line flags, user agent included
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = self.chrome_flags.clone();
        args.push(format!("--user-agent={}", self.user_agent));
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.window_size, (1920, 1080));
        assert!(config.user_agent.contains("Chrome/131"));
        assert_eq!(config.navigation_timeout, Duration::from_secs(60));
        assert_eq!(config.action_timeout, Duration::from_secs(15));
        assert_eq!(config.blocked_resource_types, vec!["font", "media"]);
    }

    #[test]
    fn test_launch_args_carry_stealth_flag_and_user_agent() {
        let args = BrowserConfig::default().launch_args();
        assert!(args.iter().any(|a| a.contains("AutomationControlled")));
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
    }

    #[test]
    fn test_blank_user_agent_falls_back() {
        let settings = BrowserSettings {
            user_agent: "  ".to_string(),
            blocked_resource_types: vec!["Font".to_string()],
            ..BrowserSettings::default()
        };
        let config = BrowserConfig::from(&settings);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.blocked_resource_types, vec!["font"]);
    }

    #[test]
    fn test_debug_mode() {
        let config = BrowserConfig::debug_mode();
        assert!(!config.headless);
    }
}
