use super::AsuraScraper;
use crate::browser::PageDriver;
use crate::helpers::{chapter_number_from_url, resolve_url, title_case};
use crate::models::ChapterPanels;
use crate::sources::{attr, css, element_text};
use crate::timing::ScopedTimer;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

/// Present once the reader has rendered its first panel
pub const PANEL_READY_SELECTOR: &str = r#"img[alt*="chapter page"]"#;

static CHAPTER_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/series/([^/]+?)(?:-[a-f0-9]{6,})?/chapter/(\d+)").expect("chapter url regex")
});
static READER_IMAGE: Lazy<Selector> = Lazy::new(|| css("div.w-full.mx-auto.center img"));
static ANY_IMAGE: Lazy<Selector> = Lazy::new(|| css("img"));
static SERIES_LINK: Lazy<Selector> = Lazy::new(|| css(r#"a[href*="/series/"]"#));

/// What a chapter page yielded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelScan {
    /// Series name from the page's breadcrumb link, if any
    pub series_name: Option<String>,
    pub image_urls: Vec<String>,
    /// Reader images that never got a real source
    pub skipped: usize,
    pub used_fallback: bool,
}

/// Series name and chapter number encoded in a chapter URL
pub fn chapter_identity(chapter_url: &str) -> (String, String) {
    match CHAPTER_URL.captures(chapter_url) {
        Some(caps) => (title_case(&caps[1].replace('-', " ")), caps[2].to_string()),
        None => (
            "Unknown Manhwa".to_string(),
            chapter_number_from_url(chapter_url).unwrap_or_else(|| "0".to_string()),
        ),
    }
}

fn image_source<'a>(img: ElementRef<'a>) -> Option<&'a str> {
    attr(img, "src").or_else(|| attr(img, "data-src"))
}

fn is_end_marker(src: &str, alt: &str) -> bool {
    src.contains("EndDesign") || alt.contains("end page")
}

fn is_placeholder(src: &str) -> bool {
    src.is_empty() || src.starts_with("data:")
}

pub fn parse_panels(html: &str, chapter_url: &str) -> PanelScan {
    let document = Html::parse_document(html);
    let mut scan = PanelScan::default();

    scan.series_name = document
        .select(&SERIES_LINK)
        .map(element_text)
        .find(|t| t.chars().count() > 3 && !t.to_lowercase().contains("chapter"));

    for img in document.select(&READER_IMAGE) {
        let src = image_source(img).unwrap_or_default();
        let alt = attr(img, "alt").unwrap_or_default().to_lowercase();

        if is_end_marker(src, &alt) {
            continue;
        }
        if is_placeholder(src) {
            scan.skipped += 1;
            continue;
        }
        if alt.contains("chapter page") || src.contains("/storage/media/") {
            scan.image_urls.push(resolve_url(chapter_url, src));
        }
    }

    if scan.image_urls.is_empty() {
        scan.used_fallback = true;
        for img in document.select(&ANY_IMAGE) {
            let src = image_source(img).unwrap_or_default();
            let alt = attr(img, "alt").unwrap_or_default().to_lowercase();

            if alt.contains("chapter page") && !is_end_marker(src, &alt) && !is_placeholder(src) {
                scan.image_urls.push(resolve_url(chapter_url, src));
            }
        }
    }

    scan
}

impl<P: PageDriver> AsuraScraper<P> {
    /// Panel image URLs of a chapter in reading order
    pub fn extract_panels(&self, chapter_url: &str) -> ChapterPanels {
        let _timer = ScopedTimer::new(format!("extract {}", chapter_url));

        if !self.open("panels", chapter_url) {
            return ChapterPanels::unknown();
        }

        let wait = Duration::from_secs(self.timings.panel_wait_secs);
        if let Err(e) = self.page.wait_for_selector(PANEL_READY_SELECTOR, wait) {
            log::warn!("{}, continuing anyway", e);
        }

        log::info!("Scrolling to load all panels...");
        self.scroll
            .force_lazy_load(&self.page, Duration::from_millis(self.timings.first_scroll_pause_ms));
        self.settle(self.timings.first_scroll_settle_ms);
        self.scroll
            .force_lazy_load(&self.page, Duration::from_millis(self.timings.second_scroll_pause_ms));
        self.settle(self.timings.second_scroll_settle_ms);

        let (series_name, chapter_number) = chapter_identity(chapter_url);
        let Some(html) = self.snapshot("panels") else {
            return ChapterPanels {
                series_name,
                chapter_number,
                image_urls: Vec::new(),
            };
        };

        let scan = parse_panels(&html, chapter_url);
        if scan.used_fallback {
            log::debug!("Reader container had no panels, used the broad image search");
        }
        self.metrics
            .record_extraction("panels", scan.image_urls.len(), scan.skipped);

        ChapterPanels {
            series_name: scan.series_name.unwrap_or(series_name),
            chapter_number,
            image_urls: scan.image_urls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAPTER: &str = "https://asuracomic.net/series/the-tutorial-is-too-hard-74967906/chapter/12";

    #[test]
    fn test_identity_from_url() {
        assert_eq!(
            chapter_identity(CHAPTER),
            ("The Tutorial Is Too Hard".to_string(), "12".to_string())
        );
        assert_eq!(
            chapter_identity("https://asuracomic.net/series/nano-machine/chapter/3"),
            ("Nano Machine".to_string(), "3".to_string())
        );
        assert_eq!(
            chapter_identity("https://asuracomic.net/read/chapter/7"),
            ("Unknown Manhwa".to_string(), "7".to_string())
        );
        assert_eq!(
            chapter_identity("https://asuracomic.net/"),
            ("Unknown Manhwa".to_string(), "0".to_string())
        );
    }

    #[test]
    fn test_primary_strategy_filters_markers_and_placeholders() {
        let html = r#"
        <a href="/series/the-tutorial-is-too-hard-74967906/chapter/11">Chapter 11</a>
        <a href="/series/the-tutorial-is-too-hard-74967906">The Tutorial is Too Hard</a>
        <div class="w-full mx-auto center">
          <img src="https://gg.asuracomic.net/storage/media/1/01.webp" alt="">
          <img src="data:image/gif;base64,R0lGOD" alt="chapter page 2">
          <img data-src="/storage/media/1/03.webp" alt="chapter page 3">
          <img src="https://cdn.example/ad.png" alt="banner">
          <img src="https://gg.asuracomic.net/storage/media/1/EndDesign.webp" alt="chapter page 4">
          <img src="https://gg.asuracomic.net/storage/media/1/end.webp" alt="End Page">
        </div>"#;

        let scan = parse_panels(html, CHAPTER);

        assert_eq!(scan.series_name.as_deref(), Some("The Tutorial is Too Hard"));
        assert!(!scan.used_fallback);
        assert_eq!(scan.skipped, 1);
        assert_eq!(
            scan.image_urls,
            vec![
                "https://gg.asuracomic.net/storage/media/1/01.webp",
                "https://asuracomic.net/storage/media/1/03.webp",
            ]
        );
    }

    #[test]
    fn test_fallback_when_reader_container_missing() {
        let html = r#"
        <main>
          <img src="/logo.png" alt="logo">
          <img src="https://cdn.example/p1.jpg" alt="Chapter Page 1">
          <img src="data:image/png;base64,AAAA" alt="chapter page 2">
        </main>"#;

        let scan = parse_panels(html, CHAPTER);

        assert!(scan.used_fallback);
        assert_eq!(scan.image_urls, vec!["https://cdn.example/p1.jpg"]);
        assert_eq!(scan.series_name, None);
    }
}
