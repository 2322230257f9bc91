// Library interface for manhwa_scraper
// The binary and the integration tests drive the pipeline through these modules

pub mod browser;
pub mod config;
pub mod downloader;
pub mod helpers;
pub mod http_client;
#[cfg(feature = "enhance")]
pub mod imaging;
pub mod menu;
pub mod metrics;
pub mod models;
pub mod sources;
pub mod timing;
