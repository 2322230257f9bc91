use super::AsuraScraper;
use crate::browser::PageDriver;
use crate::helpers::{chapter_number_from_url, make_full_url, normalize_text, series_title_from_url, sort_chapters};
use crate::models::{ChapterEntry, ListingEntry, PopularTab, UpdateEntry};
use crate::sources::{attr, css, element_text, first_matching, Extraction};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashSet;

static TAB_PANELS: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![
        css(r#"[role="tabpanel"][data-state="active"]"#),
        css(r#"[role="tabpanel"]"#),
    ]
});
static POPULAR_ROW: Lazy<Selector> = Lazy::new(|| css(r"div.flex.px-\[15px\].py-3"));
static POPULAR_RANK: Lazy<Selector> = Lazy::new(|| css("div.text-center"));
static POPULAR_LINK: Lazy<Vec<Selector>> =
    Lazy::new(|| vec![css("span.block a"), css("a.overflow-hidden.block")]);
static POPULAR_RATING: Lazy<Selector> = Lazy::new(|| css("div.italic"));

static SERIES_LINK: Lazy<Selector> = Lazy::new(|| css(r#"a[href*="/series/"]"#));
static LINK_LABEL: Lazy<Selector> = Lazy::new(|| css("span.block, span, p"));
static LINK_IMAGE: Lazy<Selector> = Lazy::new(|| css("img"));

static SERIES_HEADING: Lazy<Vec<Selector>> =
    Lazy::new(|| vec![css("span.text-xl"), css("h1"), css("h2.font-bold"), css("h3")]);
static CHAPTER_LINK: Lazy<Selector> = Lazy::new(|| css(r#"a[href*="/chapter/"]"#));

/// Clicks the tab whose label matches, returns whether one was found
fn tab_click_script(label: &str) -> String {
    let wanted = serde_json::Value::String(label.to_lowercase());
    format!(
        r#"(() => {{
    const buttons = document.querySelectorAll('[role="tablist"] button[role="tab"]');
    for (const btn of buttons) {{
        if (btn.innerText.trim().toLowerCase() === {wanted}) {{
            btn.click();
            return true;
        }}
    }}
    return false;
}})()"#
    )
}

/// Rows of the popular sidebar's active panel
pub fn parse_popular(html: &str, base_url: &str) -> Extraction<ListingEntry> {
    let document = Html::parse_document(html);
    let mut extraction = Extraction::default();

    let Some(panel) = first_matching(document.root_element(), &TAB_PANELS) else {
        log::debug!("No tab panel on the page");
        return extraction;
    };

    for row in panel.select(&POPULAR_ROW) {
        let link = match first_matching(row, &POPULAR_LINK) {
            Some(link) => link,
            None => {
                extraction.skip();
                continue;
            }
        };

        let title = element_text(link);
        let href = match attr(link, "href") {
            Some(href) if !title.is_empty() => href,
            _ => {
                extraction.skip();
                continue;
            }
        };

        let rank = row
            .select(&POPULAR_RANK)
            .next()
            .map(element_text)
            .filter(|r| !r.is_empty());
        let rating = row
            .select(&POPULAR_RATING)
            .next()
            .map(element_text)
            .filter(|r| !r.is_empty());

        extraction.push(ListingEntry {
            rank,
            title,
            url: make_full_url(base_url, href),
            rating,
        });
    }

    extraction
}

/// Series links of the homepage feed, first occurrence of each href wins
pub fn parse_latest_updates(html: &str, base_url: &str) -> Extraction<UpdateEntry> {
    let document = Html::parse_document(html);
    let mut extraction = Extraction::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for link in document.select(&SERIES_LINK) {
        let Some(href) = attr(link, "href") else {
            extraction.skip();
            continue;
        };
        if seen.contains(href) || href.contains("/chapter/") {
            continue;
        }

        let mut title = link
            .select(&LINK_LABEL)
            .next()
            .map(element_text)
            .unwrap_or_default();
        if title.is_empty() {
            title = link
                .select(&LINK_IMAGE)
                .next()
                .and_then(|img| attr(img, "alt"))
                .map(normalize_text)
                .unwrap_or_default();
        }
        if title.chars().count() < 2 {
            extraction.skip();
            continue;
        }

        seen.insert(href);
        extraction.push(UpdateEntry {
            title,
            url: make_full_url(base_url, href),
        });
    }

    extraction
}

/// Series heading and its chapters sorted by number
pub fn parse_chapter_list(html: &str, series_url: &str, base_url: &str) -> (String, Extraction<ChapterEntry>) {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title = SERIES_HEADING
        .iter()
        .filter_map(|selector| root.select(selector).next())
        .map(element_text)
        .find(|t| t.chars().count() > 2)
        .or_else(|| series_title_from_url(series_url))
        .unwrap_or_default();

    let mut extraction = Extraction::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for link in root.select(&CHAPTER_LINK) {
        let Some(href) = attr(link, "href") else {
            extraction.skip();
            continue;
        };
        if !seen.insert(href) {
            continue;
        }

        let chapter_number = chapter_number_from_url(href).unwrap_or_else(|| "?".to_string());
        let text = element_text(link);
        let title = if text.is_empty() {
            format!("Chapter {}", chapter_number)
        } else {
            text
        };

        extraction.push(ChapterEntry {
            chapter_number,
            title,
            url: make_full_url(base_url, href),
        });
    }

    sort_chapters(&mut extraction.items);
    (title, extraction)
}

impl<P: PageDriver> AsuraScraper<P> {
    /// Popular sidebar of the homepage for the given tab
    pub fn popular(&self, tab: PopularTab) -> Vec<ListingEntry> {
        log::info!("Loading homepage for popular ({})...", tab);
        if !self.open("popular", &self.base_url) {
            return Vec::new();
        }
        self.settle(self.timings.popular_settle_ms);

        match self.page.evaluate(&tab_click_script(tab.label()), false) {
            Ok(Some(serde_json::Value::Bool(true))) => self.settle(self.timings.tab_click_settle_ms),
            Ok(_) => log::debug!("No '{}' tab found, reading the panel as rendered", tab),
            Err(e) => log::debug!("Tab click failed: {}", e),
        }

        let Some(html) = self.snapshot("popular") else {
            return Vec::new();
        };
        let extraction = parse_popular(&html, &self.base_url);
        self.metrics
            .record_extraction("popular", extraction.items.len(), extraction.skipped);
        extraction.items
    }

    /// Series links from the homepage feed
    pub fn latest_updates(&self) -> Vec<UpdateEntry> {
        log::info!("Loading homepage for latest updates...");
        if !self.open("latest", &self.base_url) {
            return Vec::new();
        }
        self.settle(self.timings.latest_settle_ms);

        let Some(html) = self.snapshot("latest") else {
            return Vec::new();
        };
        let extraction = parse_latest_updates(&html, &self.base_url);
        self.metrics
            .record_extraction("latest", extraction.items.len(), extraction.skipped);
        extraction.items
    }

    /// Series title and its chapters; `("", [])` when the page cannot be loaded
    pub fn chapter_list(&self, series_url: &str) -> (String, Vec<ChapterEntry>) {
        log::info!("Loading series page {}...", series_url);
        if !self.open("chapters", series_url) {
            return (String::new(), Vec::new());
        }
        self.settle(self.timings.chapters_settle_ms);

        let Some(html) = self.snapshot("chapters") else {
            return (String::new(), Vec::new());
        };
        let (title, extraction) = parse_chapter_list(&html, series_url, &self.base_url);
        self.metrics
            .record_extraction("chapters", extraction.items.len(), extraction.skipped);
        (title, extraction.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://asuracomic.net";

    const HOMEPAGE: &str = r#"
    <html><body>
      <div role="tablist">
        <button role="tab">Weekly</button><button role="tab">Monthly</button><button role="tab">All</button>
      </div>
      <div role="tabpanel" data-state="inactive">
        <div class="flex px-[15px] py-3">
          <div class="text-center">1</div>
          <span class="block"><a href="/series/stale-11111111">Stale Row</a></span>
        </div>
      </div>
      <div role="tabpanel" data-state="active">
        <div class="flex px-[15px] py-3">
          <div class="text-center">1</div>
          <span class="block"><a href="/series/nano-machine-ccdc98ed">Nano Machine</a></span>
          <div class="italic">9.8</div>
        </div>
        <div class="flex px-[15px] py-3">
          <div class="text-center">2</div>
          <a class="overflow-hidden block" href="series/solo-leveling-0a1b2c3d">Solo Leveling</a>
        </div>
        <div class="flex px-[15px] py-3">
          <div class="text-center">3</div>
          <span>no link here</span>
        </div>
      </div>
    </body></html>"#;

    #[test]
    fn test_popular_reads_active_panel() {
        let extraction = parse_popular(HOMEPAGE, BASE);

        assert_eq!(extraction.items.len(), 2);
        assert_eq!(extraction.skipped, 1);

        let first = &extraction.items[0];
        assert_eq!(first.rank.as_deref(), Some("1"));
        assert_eq!(first.title, "Nano Machine");
        assert_eq!(first.url, "https://asuracomic.net/series/nano-machine-ccdc98ed");
        assert_eq!(first.rating.as_deref(), Some("9.8"));

        let second = &extraction.items[1];
        assert_eq!(second.url, "https://asuracomic.net/series/solo-leveling-0a1b2c3d");
        assert_eq!(second.rating, None);
    }

    #[test]
    fn test_popular_without_panels_is_empty() {
        let extraction = parse_popular("<html><body><p>maintenance</p></body></html>", BASE);
        assert!(extraction.items.is_empty());
        assert_eq!(extraction.skipped, 0);
    }

    #[test]
    fn test_latest_dedupes_by_href_first_wins() {
        let html = r#"
        <div>
          <a href="/series/alpha-12345678"><span class="block">Alpha</span></a>
          <a href="/series/alpha-12345678"><span class="block">Alpha Again</span></a>
          <a href="/series/alpha-12345678/chapter/12"><span>Chapter 12</span></a>
          <a href="/series/beta-87654321"><img alt="Beta Cover Title" src="/b.webp"></a>
          <a href="/series/gamma-abcdef12"><p>G</p></a>
        </div>"#;

        let extraction = parse_latest_updates(html, BASE);
        let titles: Vec<&str> = extraction.items.iter().map(|u| u.title.as_str()).collect();

        assert_eq!(titles, vec!["Alpha", "Beta Cover Title"]);
        assert_eq!(extraction.items[0].url, "https://asuracomic.net/series/alpha-12345678");
        assert_eq!(extraction.skipped, 1);
    }

    #[test]
    fn test_chapter_list_sorted_and_titled() {
        let html = r#"
        <h1>Nano Machine</h1>
        <a href="/series/nano-machine-ccdc98ed/chapter/10">Chapter 10</a>
        <a href="/series/nano-machine-ccdc98ed/chapter/2">Chapter 2</a>
        <a href="/series/nano-machine-ccdc98ed/chapter/2">Chapter 2 (dup)</a>
        <a href="nano-machine-ccdc98ed/chapter/1"></a>
        <a href="/series/nano-machine-ccdc98ed/chapter/extra">Special</a>"#;

        let (title, extraction) =
            parse_chapter_list(html, "https://asuracomic.net/series/nano-machine-ccdc98ed", BASE);

        assert_eq!(title, "Nano Machine");
        let numbers: Vec<&str> = extraction.items.iter().map(|c| c.chapter_number.as_str()).collect();
        assert_eq!(numbers, vec!["?", "1", "2", "10"]);
        assert_eq!(extraction.items[1].title, "Chapter 1");
        assert_eq!(
            extraction.items[1].url,
            "https://asuracomic.net/series/nano-machine-ccdc98ed/chapter/1"
        );
    }

    #[test]
    fn test_chapter_list_title_from_slug() {
        let html = r#"<h1>AB</h1><a href="/series/x/chapter/1">1</a>"#;
        let (title, _) = parse_chapter_list(
            html,
            "https://asuracomic.net/series/the-tutorial-is-too-hard-74967906",
            BASE,
        );
        assert_eq!(title, "The Tutorial Is Too Hard");
    }

    #[test]
    fn test_tab_click_script_quotes_label() {
        let script = tab_click_script("All");
        assert!(script.contains(r#"=== "all""#));
        assert!(script.contains(r#"button[role="tab"]"#));
    }
}
