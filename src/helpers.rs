//! Helper functions shared by the extractors, the downloader and the menu
//!
//! This module provides:
//! - Filesystem-safe series names
//! - URL normalization for site-relative links
//! - Series name derivation from chapter and series slugs
//! - Numeric chapter ordering and chapter-range selection
//!
//! # Examples
//!
//! ```
//! use manhwa_scraper::helpers::{sanitize_filename, series_name_from_slug};
//!
//! assert_eq!(sanitize_filename("Solo: Max-Level/Newbie?"), "Solo Max-Level Newbie");
//! assert_eq!(series_name_from_slug("nano-machine-ccdc98ed"), "Nano Machine");
//! ```

use crate::models::ChapterEntry;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use std::collections::HashSet;

static HEX_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-[a-f0-9]{6,}$").expect("hex suffix regex"));
static SERIES_SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/series/([^/?#]+)").expect("series slug regex"));
static CHAPTER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/chapter/(\d+)").expect("chapter number regex"));

/// Make a series name safe to use as a directory name.
///
/// Drops `<>:"|?*`, turns path separators into spaces, collapses whitespace
/// and trims leading/trailing whitespace and dots.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*'))
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_matches(|c: char| c.is_whitespace() || c == '.');

    if trimmed.is_empty() {
        "Untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Turn a site href into an absolute URL.
///
/// The site sometimes renders series links without the `/series/` prefix
/// (`pick-me-up-8b65e2fc/chapter/1`), so bare paths are re-rooted under it.
pub fn make_full_url(base_url: &str, href: &str) -> String {
    if href.is_empty() {
        return String::new();
    }
    if href.starts_with("http") {
        return href.to_string();
    }

    let path = href.trim_start_matches('/');
    let base = base_url.trim_end_matches('/');
    if path.starts_with("series/") {
        format!("{}/{}", base, path)
    } else {
        format!("{}/series/{}", base, path)
    }
}

/// Resolve an image `src` against the page it was found on
pub fn resolve_url(page_url: &str, src: &str) -> String {
    if src.starts_with("http://") || src.starts_with("https://") {
        return src.to_string();
    }
    Url::parse(page_url)
        .and_then(|base| base.join(src))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| src.to_string())
}

/// Capitalize the first letter of every word and lowercase the rest.
/// A word starts after any non-alphabetic character.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

/// `nano-machine-ccdc98ed` -> `Nano Machine`
pub fn series_name_from_slug(slug: &str) -> String {
    let without_id = HEX_SUFFIX.replace(slug, "");
    title_case(&without_id.replace('-', " "))
}

/// Series name derived from the `/series/<slug>` segment of any site URL
pub fn series_title_from_url(url: &str) -> Option<String> {
    SERIES_SLUG
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| series_name_from_slug(m.as_str()))
        .filter(|t| !t.trim().is_empty())
}

/// Digits after `/chapter/` in a URL
pub fn chapter_number_from_url(url: &str) -> Option<String> {
    CHAPTER_NUMBER
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Value of an all-digit chapter number
fn chapter_value(chapter_number: &str) -> Option<u64> {
    if !chapter_number.is_empty() && chapter_number.chars().all(|c| c.is_ascii_digit()) {
        chapter_number.parse().ok()
    } else {
        None
    }
}

/// Numeric key used to order chapters; non-numeric tokens count as 0
pub fn chapter_sort_key(chapter_number: &str) -> u64 {
    chapter_value(chapter_number).unwrap_or(0)
}

/// Stable ascending sort by numeric chapter number
pub fn sort_chapters(chapters: &mut [ChapterEntry]) {
    chapters.sort_by_key(|c| chapter_sort_key(&c.chapter_number));
}

/// Collapse runs of whitespace, mirroring how rendered text reads
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` characters
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// File extension of the URL path (with the dot), `.jpg` when absent
pub fn extension_from_url(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    };
    let file = path.rsplit('/').next().unwrap_or(&path);
    match file.rfind('.') {
        Some(idx) if idx > 0 && idx < file.len() - 1 => file[idx..].to_string(),
        _ => ".jpg".to_string(),
    }
}

/// Chapters picked by a menu expression: `all`, `5`, `1-10`, `5,10,15`.
///
/// Ranges are inclusive and match chapters whose number falls inside them,
/// single tokens are matched literally, malformed ranges are ignored. Result
/// keeps the order of `chapters`.
pub fn parse_chapter_selection<'a>(expr: &str, chapters: &'a [ChapterEntry]) -> Vec<&'a ChapterEntry> {
    let expr = expr.trim().to_lowercase();
    if expr == "all" {
        return chapters.iter().collect();
    }

    let mut ranges: Vec<(u64, u64)> = Vec::new();
    let mut literals: HashSet<String> = HashSet::new();
    let compact: String = expr.chars().filter(|c| *c != ' ').collect();
    for part in compact.split(',').filter(|p| !p.is_empty()) {
        if let Some((start, end)) = part.split_once('-') {
            if let (Ok(start), Ok(end)) = (start.parse::<u64>(), end.parse::<u64>()) {
                ranges.push((start, end));
            }
        } else {
            literals.insert(part.to_string());
        }
    }

    chapters
        .iter()
        .filter(|c| {
            literals.contains(&c.chapter_number)
                || chapter_value(&c.chapter_number)
                    .is_some_and(|n| ranges.iter().any(|&(start, end)| start <= n && n <= end))
        })
        .collect()
}
