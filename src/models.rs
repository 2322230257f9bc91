use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Tabs of the homepage popular sidebar
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopularTab {
    Weekly,
    Monthly,
    AllTime,
}

impl PopularTab {
    /// Label shown on the tab button (matched case-insensitively)
    pub fn label(&self) -> &'static str {
        match self {
            PopularTab::Weekly => "weekly",
            PopularTab::Monthly => "monthly",
            PopularTab::AllTime => "all",
        }
    }

    /// Menu choice `1`/`2`/`3`; anything else falls back to weekly
    pub fn from_choice(choice: &str) -> Self {
        match choice {
            "2" => PopularTab::Monthly,
            "3" => PopularTab::AllTime,
            _ => PopularTab::Weekly,
        }
    }
}

impl fmt::Display for PopularTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the popular sidebar
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ListingEntry {
    pub rank: Option<String>,
    pub title: String,
    pub url: String,
    pub rating: Option<String>,
}

/// A series link from the latest-updates feed
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UpdateEntry {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChapterEntry {
    /// Digits from the chapter URL, or `?` when the URL carries none
    pub chapter_number: String,
    pub title: String,
    pub url: String,
}

/// Panel image URLs of one chapter in reading order
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChapterPanels {
    pub series_name: String,
    pub chapter_number: String,
    pub image_urls: Vec<String>,
}

impl ChapterPanels {
    /// Result used when the chapter page could not be loaded
    pub fn unknown() -> Self {
        Self {
            series_name: "Unknown".to_string(),
            chapter_number: "0".to_string(),
            image_urls: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image_urls.is_empty()
    }
}

/// Resolved on-disk location of a chapter: `<root>/<series_dir>/chapter_<n>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub directory: PathBuf,
    pub series_dir: String,
    pub chapter: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// 1-based page index
    pub index: usize,
    pub url: String,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct DownloadSummary {
    pub target: DownloadTarget,
    pub saved: Vec<PathBuf>,
    pub failed: Vec<PageFailure>,
}

impl DownloadSummary {
    pub fn empty(target: DownloadTarget) -> Self {
        Self {
            target,
            saved: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.saved.len() + self.failed.len()
    }
}
