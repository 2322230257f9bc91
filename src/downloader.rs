use crate::config::Config;
use crate::helpers::{extension_from_url, sanitize_filename};
use crate::http_client::{HttpClientConfig, ImageClient};
#[cfg(feature = "enhance")]
use crate::imaging;
use crate::metrics::ScrapeMetrics;
use crate::models::{DownloadSummary, DownloadTarget, PageFailure};
use crate::timing::ScopedTimer;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "enhance")]
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Saves chapter panels to `<result>/<series>/chapter_<n>/page_NNN.<ext>`
pub struct ChapterDownloader {
    result_dir: PathBuf,
    http: HttpClientConfig,
    min_width: u32,
    enhance: bool,
    metrics: ScrapeMetrics,
}

impl ChapterDownloader {
    pub fn new(config: &Config, metrics: ScrapeMetrics) -> Self {
        Self {
            result_dir: PathBuf::from(&config.site.result_dir),
            http: HttpClientConfig::from(config),
            min_width: config.download.min_width,
            enhance: config.download.enhance,
            metrics,
        }
    }

    /// Write under `dir` instead of the configured result folder
    pub fn with_result_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.result_dir = dir.into();
        self
    }

    /// Whether pages are normalized to PNG or written as fetched
    pub fn enhances(&self) -> bool {
        cfg!(feature = "enhance") && self.enhance
    }

    pub fn min_width(&self) -> u32 {
        self.min_width
    }

    pub fn target(&self, series: &str, chapter: &str) -> DownloadTarget {
        let series_dir = sanitize_filename(series);
        let directory = self
            .result_dir
            .join(&series_dir)
            .join(format!("chapter_{}", chapter));

        DownloadTarget {
            directory,
            series_dir,
            chapter: chapter.to_string(),
        }
    }

    /// Download every URL in order. A failed page is recorded and skipped;
    /// the remaining pages are still attempted.
    pub async fn download_chapter(&self, series: &str, chapter: &str, urls: &[String]) -> DownloadSummary {
        let target = self.target(series, chapter);
        let mut summary = DownloadSummary::empty(target.clone());

        if urls.is_empty() {
            log::warn!("No images to download for {} chapter {}", series, chapter);
            return summary;
        }

        let _timer = ScopedTimer::new(format!("download {} ch.{}", target.series_dir, chapter));
        self.metrics.record_chapter();

        // One client per chapter, dropped when the chapter is done
        let prepared = match tokio::fs::create_dir_all(&target.directory).await {
            Ok(()) => ImageClient::with_config(&self.http),
            Err(e) => Err(DownloadError::from(e)),
        };
        let client = match prepared {
            Ok(client) => client,
            Err(e) => {
                log::warn!("Cannot download into {}: {}", target.directory.display(), e);
                for (i, url) in urls.iter().enumerate() {
                    self.fail(&mut summary, i + 1, url, &e);
                }
                return summary;
            }
        };

        log::info!("Downloading {} pages to {}", urls.len(), target.directory.display());

        for (i, url) in urls.iter().enumerate() {
            let index = i + 1;
            let stem = target.directory.join(format!("page_{:03}", index));
            let started = Instant::now();

            match self.save_page(&client, url, &stem).await {
                Ok(path) => {
                    log::debug!("[{}/{}] saved {}", index, urls.len(), path.display());
                    self.metrics.record_page_saved(started.elapsed());
                    summary.saved.push(path);
                }
                Err(e) => self.fail(&mut summary, index, url, &e),
            }
        }

        log::info!(
            "Download complete: {}/{} pages -> {}",
            summary.saved.len(),
            summary.total(),
            target.directory.display()
        );
        summary
    }

    fn fail(&self, summary: &mut DownloadSummary, index: usize, url: &str, error: &DownloadError) {
        log::warn!("Failed page {}: {}", index, error);
        self.metrics.record_page_failed(error.to_string());
        summary.failed.push(PageFailure {
            index,
            url: url.to_string(),
            error: error.to_string(),
        });
    }

    async fn save_page(&self, client: &ImageClient, url: &str, stem: &Path) -> Result<PathBuf, DownloadError> {
        let bytes = client.fetch(url).await?;

        #[cfg(feature = "enhance")]
        {
            if self.enhance {
                let img = imaging::normalize(&bytes, self.min_width)?;
                let path = stem.with_extension("png");
                tokio::fs::write(&path, imaging::encode_png(&img)?).await?;
                return Ok(path);
            }
        }

        let ext = extension_from_url(url);
        let path = stem.with_extension(ext.trim_start_matches('.'));
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }
}
