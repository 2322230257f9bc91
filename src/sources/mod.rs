//! Site extractors
//!
//! Pages are rendered by Chrome, then the serialized DOM is parsed with
//! `scraper`. Layout changes on the site are absorbed by trying several
//! selectors in priority order.

pub mod asurascans;

use crate::helpers::normalize_text;
use scraper::{ElementRef, Selector};

/// Compile a built-in selector
pub(crate) fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid built-in selector {}: {:?}", selector, e))
}

/// Records pulled from a page plus the number of elements that were unusable
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

impl<T> Default for Extraction<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: 0,
        }
    }
}

impl<T> Extraction<T> {
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }
}

/// All elements of the first candidate that matches anything, with that
/// candidate's position in the list
pub fn select_first_nonempty<'a>(
    root: ElementRef<'a>,
    candidates: &[Selector],
) -> Option<(usize, Vec<ElementRef<'a>>)> {
    candidates.iter().enumerate().find_map(|(idx, selector)| {
        let matched: Vec<ElementRef<'a>> = root.select(selector).collect();
        if matched.is_empty() {
            None
        } else {
            Some((idx, matched))
        }
    })
}

/// First element of the first candidate that matches anything
pub fn first_matching<'a>(root: ElementRef<'a>, candidates: &[Selector]) -> Option<ElementRef<'a>> {
    candidates.iter().find_map(|selector| root.select(selector).next())
}

/// Rendered text of an element with whitespace collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<String>())
}

/// Non-empty attribute value
pub fn attr<'a>(element: ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).map(str::trim).filter(|v| !v.is_empty())
}
