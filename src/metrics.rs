//! Counters for one scraping session
//!
//! Extractors skip malformed elements instead of failing the whole listing;
//! the skip counts land here so they stay visible.

use crate::timing::RunningAverage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationMetrics {
    pub operation: String,
    pub runs: u64,
    pub extracted: u64,
    pub skipped: u64,
    pub navigation_failures: u64,
    pub last_run: Option<DateTime<Utc>>,
}

impl OperationMetrics {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadMetrics {
    pub chapters: u64,
    pub pages_saved: u64,
    pub pages_failed: u64,
    pub page_time_ms: RunningAverage,
    pub last_error: Option<String>,
}

impl DownloadMetrics {
    pub fn success_rate(&self) -> f64 {
        let total = self.pages_saved + self.pages_failed;
        if total == 0 {
            0.0
        } else {
            (self.pages_saved as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Debug, Default)]
struct MetricsState {
    operations: BTreeMap<String, OperationMetrics>,
    downloads: DownloadMetrics,
}

/// Shared session tracker; clones observe the same counters
#[derive(Clone, Default)]
pub struct ScrapeMetrics {
    state: Arc<Mutex<MetricsState>>,
}

impl ScrapeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MetricsState> {
        // A panic mid-update leaves plain counters, still worth reporting
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_extraction(&self, operation: &str, extracted: usize, skipped: usize) {
        let mut state = self.lock();
        let op = state
            .operations
            .entry(operation.to_string())
            .or_insert_with(|| OperationMetrics::new(operation));
        op.runs += 1;
        op.extracted += extracted as u64;
        op.skipped += skipped as u64;
        op.last_run = Some(Utc::now());

        if skipped > 0 {
            log::warn!(
                "[{}] Extracted {} entries, skipped {} malformed elements",
                operation,
                extracted,
                skipped
            );
        } else {
            log::info!("[{}] Extracted {} entries", operation, extracted);
        }
    }

    pub fn record_navigation_failure(&self, operation: &str, url: &str) {
        let mut state = self.lock();
        let op = state
            .operations
            .entry(operation.to_string())
            .or_insert_with(|| OperationMetrics::new(operation));
        op.runs += 1;
        op.navigation_failures += 1;
        op.last_run = Some(Utc::now());

        log::warn!("[{}] Could not load {}", operation, url);
    }

    pub fn record_chapter(&self) {
        self.lock().downloads.chapters += 1;
    }

    pub fn record_page_saved(&self, elapsed: Duration) {
        let mut state = self.lock();
        state.downloads.pages_saved += 1;
        state
            .downloads
            .page_time_ms
            .observe(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn record_page_failed(&self, error: String) {
        let mut state = self.lock();
        state.downloads.pages_failed += 1;
        state.downloads.last_error = Some(error);
    }

    pub fn operation(&self, operation: &str) -> Option<OperationMetrics> {
        self.lock().operations.get(operation).cloned()
    }

    pub fn downloads(&self) -> DownloadMetrics {
        self.lock().downloads.clone()
    }

    /// Human-readable session report
    pub fn summary(&self) -> String {
        let state = self.lock();
        let mut lines = vec!["=== Session Summary ===".to_string()];

        for op in state.operations.values() {
            lines.push(format!(
                "  {:<9} runs: {:<3} extracted: {:<5} skipped: {:<4} nav failures: {}",
                op.operation, op.runs, op.extracted, op.skipped, op.navigation_failures
            ));
        }

        let dl = &state.downloads;
        lines.push(format!(
            "  downloads chapters: {} pages saved: {} failed: {} ({:.1}% ok)",
            dl.chapters,
            dl.pages_saved,
            dl.pages_failed,
            dl.success_rate()
        ));
        if let Some(avg) = dl.page_time_ms.average() {
            lines.push(format!("  avg page time: {:.0}ms", avg));
        }
        if let Some(err) = &dl.last_error {
            lines.push(format!("  last error: {}", err));
        }

        lines.join("\n")
    }

    pub fn export_json(&self) -> String {
        let state = self.lock();
        serde_json::to_string_pretty(&serde_json::json!({
            "operations": &state.operations,
            "downloads": &state.downloads,
        }))
        .unwrap_or_else(|_| "{}".to_string())
    }
}
