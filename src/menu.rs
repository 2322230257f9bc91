//! Interactive terminal front end
//!
//! Reads choices line by line from any `BufRead` and writes menus to any
//! `Write`, so whole sessions can be replayed against a scripted page.
//! End of input behaves like choosing Exit.

use crate::browser::PageDriver;
use crate::downloader::ChapterDownloader;
use crate::helpers::{parse_chapter_selection, truncate_chars};
use crate::models::{ChapterEntry, DownloadSummary, PopularTab, UpdateEntry};
use crate::sources::asurascans::AsuraScraper;
use std::collections::HashSet;
use std::io::{self, BufRead, Write};

const LATEST_LIMIT: usize = 20;
const RULE_WIDTH: usize = 55;

/// Whether the session continues after a sub-menu returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Quit,
}

pub struct Menu<P: PageDriver, R: BufRead, W: Write> {
    scraper: AsuraScraper<P>,
    downloader: ChapterDownloader,
    input: R,
    out: W,
}

fn rule(c: char) -> String {
    c.to_string().repeat(RULE_WIDTH)
}

impl<P: PageDriver, R: BufRead, W: Write> Menu<P, R, W> {
    pub fn new(scraper: AsuraScraper<P>, downloader: ChapterDownloader, input: R, out: W) -> Self {
        Self {
            scraper,
            downloader,
            input,
            out,
        }
    }

    /// Print `label` and read one trimmed line; `None` at end of input
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "\n  {} > ", label)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn banner(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "    ╔══════════════════════════════════════════════════╗")?;
        writeln!(self.out, "    ║      ASURA SCANS MANHWA SCRAPER  (Chrome)        ║")?;
        writeln!(self.out, "    ║      High-Quality Panel Downloader               ║")?;
        writeln!(self.out, "    ╚══════════════════════════════════════════════════╝")?;
        if !self.downloader.enhances() {
            writeln!(self.out, "  [i] Image enhancement is off, pages are saved as fetched.")?;
        }
        Ok(())
    }

    fn main_menu(&mut self) -> io::Result<()> {
        writeln!(self.out, "\n  ┌─── MAIN MENU ────────────────────────────────┐")?;
        writeln!(self.out, "  │  1. Popular Manhwa (Weekly/Monthly/All)       │")?;
        writeln!(self.out, "  │  2. Latest Updates                            │")?;
        writeln!(self.out, "  │  3. Direct Chapter URL                        │")?;
        writeln!(self.out, "  │  4. Enter Series URL                          │")?;
        writeln!(self.out, "  │  0. Exit                                      │")?;
        writeln!(self.out, "  └───────────────────────────────────────────────┘")?;
        Ok(())
    }

    /// Run until Exit or end of input, then print the session summary
    pub async fn run(&mut self) -> io::Result<()> {
        self.banner()?;

        loop {
            self.main_menu()?;
            let Some(choice) = self.prompt("Select")? else {
                break;
            };

            let step = match choice.as_str() {
                "1" => self.popular_menu().await?,
                "2" => self.latest_menu().await?,
                "3" => self.direct_url_menu().await?,
                "4" => self.series_url_menu().await?,
                "0" => {
                    writeln!(self.out, "\n  Bye!")?;
                    Step::Quit
                }
                _ => {
                    writeln!(self.out, "  [!] Invalid option.")?;
                    Step::Continue
                }
            };

            if step == Step::Quit {
                break;
            }
        }

        writeln!(self.out, "\n{}", self.scraper.metrics().summary())?;
        self.out.flush()
    }

    pub async fn popular_menu(&mut self) -> io::Result<Step> {
        loop {
            writeln!(self.out, "\n  ┌─── Popular Manhwa ─────────────────────────┐")?;
            writeln!(self.out, "  │  1. Weekly                                  │")?;
            writeln!(self.out, "  │  2. Monthly                                 │")?;
            writeln!(self.out, "  │  3. All Time                                │")?;
            writeln!(self.out, "  │  0. Back                                    │")?;
            writeln!(self.out, "  └─────────────────────────────────────────────┘")?;

            let Some(choice) = self.prompt("Select tab")? else {
                return Ok(Step::Quit);
            };
            if choice == "0" {
                return Ok(Step::Continue);
            }

            let entries = self.scraper.popular(PopularTab::from_choice(&choice));
            if entries.is_empty() {
                writeln!(self.out, "  [!] No manhwa found.")?;
                continue;
            }

            writeln!(self.out, "\n  {}", rule('─'))?;
            writeln!(self.out, "  {:<4} {:<35} {:<8}", "#", "Title", "Rating")?;
            writeln!(self.out, "  {}", rule('─'))?;
            for entry in &entries {
                writeln!(
                    self.out,
                    "  {:<4} {:<35} ★ {:<6}",
                    entry.rank.as_deref().unwrap_or("?"),
                    truncate_chars(&entry.title, 33),
                    entry.rating.as_deref().unwrap_or("N/A")
                )?;
            }
            writeln!(self.out, "  {}", rule('─'))?;

            let Some(pick) = self.prompt("Enter rank # to select (0 = back)")? else {
                return Ok(Step::Quit);
            };
            if pick == "0" {
                continue;
            }

            let selected = entries
                .iter()
                .find(|e| e.rank.as_deref().unwrap_or("?") == pick)
                .cloned();
            match selected {
                Some(entry) => {
                    if self.series_menu(&entry.url, Some(&entry.title)).await? == Step::Quit {
                        return Ok(Step::Quit);
                    }
                }
                None => writeln!(self.out, "  [!] Invalid selection.")?,
            }
        }
    }

    pub async fn latest_menu(&mut self) -> io::Result<Step> {
        let updates = unique_updates(self.scraper.latest_updates(), LATEST_LIMIT);
        if updates.is_empty() {
            writeln!(self.out, "  [!] No updates found.")?;
            return Ok(Step::Continue);
        }

        writeln!(self.out, "\n  {}", rule('─'))?;
        writeln!(self.out, "  {:<4} {:<50}", "#", "Title")?;
        writeln!(self.out, "  {}", rule('─'))?;
        for (i, update) in updates.iter().enumerate() {
            writeln!(self.out, "  {:<4} {}", i + 1, truncate_chars(&update.title, 48))?;
        }
        writeln!(self.out, "  {}", rule('─'))?;

        let Some(pick) = self.prompt("Enter number to select (0 = back)")? else {
            return Ok(Step::Quit);
        };
        if pick == "0" {
            return Ok(Step::Continue);
        }

        match pick.parse::<usize>() {
            Ok(n) if (1..=updates.len()).contains(&n) => {
                let update = &updates[n - 1];
                self.series_menu(&update.url, Some(&update.title)).await
            }
            Ok(_) => {
                writeln!(self.out, "  [!] Invalid selection.")?;
                Ok(Step::Continue)
            }
            Err(_) => {
                writeln!(self.out, "  [!] Invalid input.")?;
                Ok(Step::Continue)
            }
        }
    }

    pub async fn direct_url_menu(&mut self) -> io::Result<Step> {
        writeln!(self.out, "\n  Enter full chapter URL.")?;
        writeln!(
            self.out,
            "  Example: https://asuracomic.net/series/the-tutorial-is-too-hard-74967906/chapter/0"
        )?;
        writeln!(self.out, "  0 = back")?;

        let Some(url) = self.prompt("URL")? else {
            return Ok(Step::Quit);
        };
        if url == "0" {
            return Ok(Step::Continue);
        }
        if !url.to_lowercase().contains("asuracomic") {
            writeln!(self.out, "  [!] Only AsuraScans URLs supported.")?;
            return Ok(Step::Continue);
        }
        if !url.contains("/chapter/") {
            return self.series_menu(&url, None).await;
        }

        let panels = self.scraper.extract_panels(&url);
        writeln!(self.out, "  [+] Found {} panels", panels.image_urls.len())?;
        let summary = self
            .downloader
            .download_chapter(&panels.series_name, &panels.chapter_number, &panels.image_urls)
            .await;
        self.report(&summary)?;
        Ok(Step::Continue)
    }

    pub async fn series_url_menu(&mut self) -> io::Result<Step> {
        writeln!(self.out, "\n  Enter series URL.")?;
        writeln!(self.out, "  Example: https://asuracomic.net/series/nano-machine-ccdc98ed")?;

        let Some(url) = self.prompt("URL")? else {
            return Ok(Step::Quit);
        };
        if url.is_empty() || url == "0" {
            return Ok(Step::Continue);
        }
        self.series_menu(&url, None).await
    }

    /// Chapter picker for one series. A title from the listing the series was
    /// picked from wins over the scraped heading.
    pub async fn series_menu(&mut self, series_url: &str, listed_title: Option<&str>) -> io::Result<Step> {
        let (scraped_title, chapters) = self.scraper.chapter_list(series_url);
        let title = match listed_title {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => scraped_title,
        };

        if chapters.is_empty() {
            writeln!(self.out, "  [!] No chapters found.")?;
            return Ok(Step::Continue);
        }

        writeln!(self.out, "\n  Series: {}", title)?;
        writeln!(self.out, "  Total chapters: {}", chapters.len())?;
        writeln!(self.out, "  {}", rule('─'))?;
        self.list_chapters(&chapters)?;
        writeln!(self.out, "  {}", rule('─'))?;
        writeln!(self.out, "  Enter chapter(s): 1  |  1-10  |  5,10,15  |  all")?;
        writeln!(self.out, "  0 = back")?;

        let Some(pick) = self.prompt("Chapter(s)")? else {
            return Ok(Step::Quit);
        };
        if pick == "0" {
            return Ok(Step::Continue);
        }

        let selected: Vec<ChapterEntry> = parse_chapter_selection(&pick, &chapters)
            .into_iter()
            .cloned()
            .collect();
        if selected.is_empty() {
            writeln!(self.out, "  [!] No matching chapters.")?;
            return Ok(Step::Continue);
        }

        writeln!(self.out, "\n  [*] Will download {} chapter(s)", selected.len())?;
        for chapter in &selected {
            writeln!(self.out, "\n  {}", rule('═'))?;
            writeln!(self.out, "  Downloading: {} - Chapter {}", title, chapter.chapter_number)?;
            writeln!(self.out, "  {}", rule('═'))?;

            let panels = self.scraper.extract_panels(&chapter.url);
            writeln!(self.out, "  [+] Found {} panels", panels.image_urls.len())?;
            let summary = self
                .downloader
                .download_chapter(&title, &chapter.chapter_number, &panels.image_urls)
                .await;
            self.report(&summary)?;
        }

        Ok(Step::Continue)
    }

    fn list_chapters(&mut self, chapters: &[ChapterEntry]) -> io::Result<()> {
        let line = |ch: &ChapterEntry| format!("    Ch.{:<6} {}", ch.chapter_number, truncate_chars(&ch.title, 45));

        if chapters.len() > 20 {
            for ch in &chapters[..5] {
                writeln!(self.out, "{}", line(ch))?;
            }
            writeln!(self.out, "    ... ({} more) ...", chapters.len() - 10)?;
            for ch in &chapters[chapters.len() - 5..] {
                writeln!(self.out, "{}", line(ch))?;
            }
        } else {
            for ch in chapters {
                writeln!(self.out, "{}", line(ch))?;
            }
        }
        Ok(())
    }

    fn report(&mut self, summary: &DownloadSummary) -> io::Result<()> {
        if summary.total() == 0 {
            writeln!(self.out, "  [!] No images to download.")?;
            return Ok(());
        }

        for failure in &summary.failed {
            writeln!(self.out, "  [!] Failed page {}: {}", failure.index, failure.error)?;
        }
        writeln!(
            self.out,
            "  [OK] Download complete! {}/{} pages -> {}",
            summary.saved.len(),
            summary.total(),
            summary.target.directory.display()
        )?;
        if self.downloader.enhances() {
            writeln!(
                self.out,
                "  [OK] Images upscaled & sharpened (min {}px wide)",
                self.downloader.min_width()
            )?;
        }
        Ok(())
    }
}

/// First occurrence of each URL, at most `limit` entries
pub fn unique_updates(updates: Vec<UpdateEntry>, limit: usize) -> Vec<UpdateEntry> {
    let mut seen = HashSet::new();
    updates
        .into_iter()
        .filter(|u| seen.insert(u.url.clone()))
        .take(limit)
        .collect()
}
