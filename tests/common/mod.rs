//! Shared fixtures: a scripted page and a tiny HTTP server for image fetches
#![allow(dead_code)]

use manhwa_scraper::browser::{BrowserError, PageDriver};
use manhwa_scraper::config::{Config, TimingConfig};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Page whose navigation outcomes and DOM are scripted per URL
#[derive(Default)]
pub struct FakePage {
    pages: HashMap<String, String>,
    failures: RefCell<HashMap<String, u32>>,
    has_tabs: bool,
    current: RefCell<String>,
    pub visits: RefCell<Vec<String>>,
    pub scripts: RefCell<Vec<String>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Fail the next `times` loads of `url`
    pub fn failing(self, url: &str, times: u32) -> Self {
        self.failures.borrow_mut().insert(url.to_string(), times);
        self
    }

    pub fn with_tabs(mut self) -> Self {
        self.has_tabs = true;
        self
    }

    pub fn visit_count(&self, url: &str) -> usize {
        self.visits.borrow().iter().filter(|v| *v == url).count()
    }
}

impl PageDriver for FakePage {
    fn goto(&self, url: &str) -> Result<(), BrowserError> {
        self.visits.borrow_mut().push(url.to_string());

        if let Some(left) = self.failures.borrow_mut().get_mut(url) {
            if *left > 0 {
                *left -= 1;
                return Err(BrowserError::NavigationError(format!("net::ERR_CONNECTION_RESET at {}", url)));
            }
        }
        if !self.pages.contains_key(url) {
            return Err(BrowserError::NavigationError(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)));
        }

        *self.current.borrow_mut() = url.to_string();
        Ok(())
    }

    fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<(), BrowserError> {
        let html = self.content()?;
        if html.to_lowercase().contains("chapter page") {
            Ok(())
        } else {
            Err(BrowserError::Timeout(format!("Waiting for selector: {}", selector)))
        }
    }

    fn evaluate(&self, script: &str, _await_promise: bool) -> Result<Option<serde_json::Value>, BrowserError> {
        self.scripts.borrow_mut().push(script.to_string());
        if script.contains(r#"button[role="tab"]"#) {
            return Ok(Some(serde_json::Value::Bool(self.has_tabs)));
        }
        Ok(None)
    }

    fn content(&self) -> Result<String, BrowserError> {
        self.pages
            .get(self.current.borrow().as_str())
            .cloned()
            .ok_or_else(|| BrowserError::HtmlExtractionError("no document loaded".to_string()))
    }

    fn current_url(&self) -> String {
        self.current.borrow().clone()
    }
}

/// Defaults with every wait and backoff set to zero
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.timings = TimingConfig::immediate();
    config.navigation.backoff_ms = 0;
    config
}

/// One recorded request: path plus lowercased header lines
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub headers: Vec<String>,
}

impl SeenRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_lowercase());
        self.headers
            .iter()
            .find(|h| h.to_lowercase().starts_with(&prefix))
            .map(|h| h[prefix.len()..].trim().to_string())
    }
}

/// Serves `routes` (path -> status, body) over HTTP/1.1 on a random local port.
/// Returns the base URL and the log of requests received.
pub async fn serve(routes: HashMap<String, (u16, Vec<u8>)>) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let routes = routes.clone();
            let log = log.clone();

            tokio::spawn(async move {
                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => raw.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&raw).to_string();
                let mut lines = head.split("\r\n");
                let path = lines
                    .next()
                    .and_then(|l| l.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                let headers = lines.filter(|l| !l.is_empty()).map(String::from).collect();
                log.lock().unwrap().push(SeenRequest {
                    path: path.clone(),
                    headers,
                });

                let (status, body) = routes
                    .get(&path)
                    .cloned()
                    .unwrap_or((404, b"not found".to_vec()));
                let reason = if status == 200 { "OK" } else { "Error" };
                let header = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
                    status,
                    reason,
                    body.len()
                );
                let _ = socket.write_all(header.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), seen)
}

/// Answers every request with `response` verbatim, then closes the connection.
/// Lets a test send headers that disagree with the body.
pub async fn serve_raw(response: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let mut raw = Vec::new();
                let mut buf = [0u8; 1024];
                while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => raw.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = socket.write_all(response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}
