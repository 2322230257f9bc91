use crate::config::{Config, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::downloader::DownloadError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

pub const IMAGE_ACCEPT: &str = "image/webp,image/apng,image/*,*/*;q=0.8";

/// Upper bound on the buffer reserved from a `Content-Length` header
const MAX_PREALLOC: u64 = 8 << 20;

/// Identity and limits of the image client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    /// Same string the browser presents
    pub user_agent: String,
    /// Site root with a trailing slash
    pub referer: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: format!("{}/", DEFAULT_BASE_URL),
        }
    }
}

impl From<&Config> for HttpClientConfig {
    fn from(config: &Config) -> Self {
        let user_agent = if config.browser.user_agent.trim().is_empty() {
            DEFAULT_USER_AGENT.to_string()
        } else {
            config.browser.user_agent.clone()
        };

        Self {
            timeout: config.download.timeout(),
            user_agent,
            referer: format!("{}/", config.site.base_url.trim_end_matches('/')),
        }
    }
}

/// HTTP client for panel images, sending the headers the image CDN expects
pub struct ImageClient {
    client: Client,
}

impl ImageClient {
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_config(&HttpClientConfig::default())
    }

    pub fn with_config(config: &HttpClientConfig) -> Result<Self, DownloadError> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_str(&config.referer)?);
        headers.insert(ACCEPT, HeaderValue::from_static(IMAGE_ACCEPT));

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(HeaderValue::from_str(&config.user_agent)?)
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch a URL, streaming the body into memory
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let reserve = response.content_length().unwrap_or(0).min(MAX_PREALLOC);
        let mut body = Vec::with_capacity(reserve as usize);
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
        }

        log::debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
