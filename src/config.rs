use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://asuracomic.net";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub timings: TimingConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Site root, also sent as the image Referer
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Root folder for downloaded chapters
    #[serde(default = "default_result_dir")]
    pub result_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserSettings {
    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Timeout for page loads in seconds
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Timeout for element waits and other tab actions in seconds
    #[serde(default = "default_action_timeout")]
    pub action_timeout_secs: u64,

    /// CDP resource types aborted by the request interceptor
    #[serde(default = "default_blocked_resource_types")]
    pub blocked_resource_types: Vec<String>,

    /// Additional Chrome flags
    #[serde(default = "default_chrome_flags")]
    pub chrome_flags: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NavigationConfig {
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Fixed pause between failed attempts
    #[serde(default = "default_backoff")]
    pub backoff_ms: u64,
}

/// Fixed waits used to let client-side rendering settle
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    #[serde(default = "default_popular_settle")]
    pub popular_settle_ms: u64,
    #[serde(default = "default_tab_click_settle")]
    pub tab_click_settle_ms: u64,
    #[serde(default = "default_latest_settle")]
    pub latest_settle_ms: u64,
    #[serde(default = "default_chapters_settle")]
    pub chapters_settle_ms: u64,
    #[serde(default = "default_panel_wait")]
    pub panel_wait_secs: u64,
    #[serde(default = "default_first_scroll_pause")]
    pub first_scroll_pause_ms: u64,
    #[serde(default = "default_first_scroll_settle")]
    pub first_scroll_settle_ms: u64,
    #[serde(default = "default_second_scroll_pause")]
    pub second_scroll_pause_ms: u64,
    #[serde(default = "default_second_scroll_settle")]
    pub second_scroll_settle_ms: u64,
    /// Pause after snapping back to the top once a scroll pass ends
    #[serde(default = "default_snap_top_pause")]
    pub snap_top_pause_ms: u64,
    /// Pause after the final snap to the bottom
    #[serde(default = "default_snap_bottom_pause")]
    pub snap_bottom_pause_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DownloadConfig {
    #[serde(default = "default_download_timeout")]
    pub timeout_secs: u64,

    /// Panels narrower than this are upscaled
    #[serde(default = "default_min_width")]
    pub min_width: u32,

    /// Upscale, sharpen and re-encode as PNG (requires the `enhance` feature)
    #[serde(default = "default_true")]
    pub enhance: bool,
}

fn default_true() -> bool { true }
fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_result_dir() -> String { "result".to_string() }
fn default_window_width() -> u32 { 1920 }
fn default_window_height() -> u32 { 1080 }
fn default_user_agent() -> String { DEFAULT_USER_AGENT.to_string() }
fn default_accept_language() -> String { "en-US,en;q=0.9".to_string() }
fn default_navigation_timeout() -> u64 { 60 }
fn default_action_timeout() -> u64 { 15 }
fn default_blocked_resource_types() -> Vec<String> { vec!["font".to_string(), "media".to_string()] }
fn default_chrome_flags() -> Vec<String> { vec!["--disable-blink-features=AutomationControlled".to_string()] }
fn default_retries() -> u32 { 3 }
fn default_backoff() -> u64 { 3000 }
fn default_popular_settle() -> u64 { 2000 }
fn default_tab_click_settle() -> u64 { 1000 }
fn default_latest_settle() -> u64 { 3000 }
fn default_chapters_settle() -> u64 { 3000 }
fn default_panel_wait() -> u64 { 20 }
fn default_first_scroll_pause() -> u64 { 350 }
fn default_first_scroll_settle() -> u64 { 2000 }
fn default_second_scroll_pause() -> u64 { 200 }
fn default_second_scroll_settle() -> u64 { 1000 }
fn default_snap_top_pause() -> u64 { 300 }
fn default_snap_bottom_pause() -> u64 { 1000 }
fn default_download_timeout() -> u64 { 30 }
fn default_min_width() -> u32 { 800 }

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            result_dir: default_result_dir(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            navigation_timeout_secs: 60,
            action_timeout_secs: 15,
            blocked_resource_types: default_blocked_resource_types(),
            chrome_flags: default_chrome_flags(),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff_ms: 3000,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            popular_settle_ms: 2000,
            tab_click_settle_ms: 1000,
            latest_settle_ms: 3000,
            chapters_settle_ms: 3000,
            panel_wait_secs: 20,
            first_scroll_pause_ms: 350,
            first_scroll_settle_ms: 2000,
            second_scroll_pause_ms: 200,
            second_scroll_settle_ms: 1000,
            snap_top_pause_ms: 300,
            snap_bottom_pause_ms: 1000,
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            min_width: 800,
            enhance: true,
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to defaults
    /// when the file is absent
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config.toml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl NavigationConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl DownloadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TimingConfig {
    /// All waits set to zero, for driving the extractors against scripted pages
    pub fn immediate() -> Self {
        Self {
            popular_settle_ms: 0,
            tab_click_settle_ms: 0,
            latest_settle_ms: 0,
            chapters_settle_ms: 0,
            panel_wait_secs: 0,
            first_scroll_pause_ms: 0,
            first_scroll_settle_ms: 0,
            second_scroll_pause_ms: 0,
            second_scroll_settle_ms: 0,
            snap_top_pause_ms: 0,
            snap_bottom_pause_ms: 0,
        }
    }
}
