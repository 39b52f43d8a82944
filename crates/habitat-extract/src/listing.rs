//! Listing-page parsing into detail-page candidates.

use crate::dom::element_text;
use crate::error::{ExtractError, Result};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Titles shorter than this fall back to the card text.
const MIN_TITLE_CHARS: usize = 5;

/// Longest title taken from raw card text.
const CARD_TEXT_TITLE_CHARS: usize = 80;

/// CSS selectors locating listing cards and their parts.
///
/// `links`, `titles` and `prices` are tried in order inside each card; the
/// first selector that matches wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// Elements wrapping one listing each
    pub cards: Vec<String>,
    /// Anchor pointing at the detail page
    pub links: Vec<String>,
    /// Element holding the listing title
    pub titles: Vec<String>,
    /// Element holding the listing price
    pub prices: Vec<String>,
}

fn owned(selectors: &[&str]) -> Vec<String> {
    selectors.iter().map(ToString::to_string).collect()
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            cards: owned(&[
                "div.property-item",
                "div.listing-card",
                "div.item",
                "div.card",
                "div.property",
                ".list-item",
                ".property-listing",
                ".listing-item",
                "[class*='property']",
                "[class*='listing']",
            ]),
            links: owned(&[
                "a.property-link",
                "a[href*='/apartamento']",
                "a[href*='/casa']",
                "a[href*='/inmueble']",
                "a[class*='link']",
                "h2 a, h3 a, h4 a",
                "a",
            ]),
            titles: owned(&["h2", "h3", "h4", ".title", ".property-title", ".name"]),
            prices: owned(&[
                ".price",
                ".precio",
                ".property-price",
                ".price_sale",
                "[class*='price']",
                ".value",
                ".cost",
            ]),
        }
    }
}

/// One listing card that points at a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCandidate {
    /// Absolute detail page URL
    pub url: String,
    /// Title shown on the card
    pub title: String,
    /// Raw price text shown on the card, when it contained digits
    pub price: Option<String>,
}

/// Compiled [`ListingSelectors`].
#[derive(Debug, Clone)]
pub struct ListingParser {
    cards: Selector,
    links: Vec<Selector>,
    titles: Vec<Selector>,
    prices: Vec<Selector>,
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

fn compile_all(list: &[String]) -> Result<Vec<Selector>> {
    list.iter().map(|css| compile(css)).collect()
}

impl ListingParser {
    /// Compile `selectors`.
    ///
    /// # Errors
    /// Returns [`ExtractError::InvalidSelector`] for the first selector that
    /// does not parse, or when no card selector is given.
    pub fn new(selectors: &ListingSelectors) -> Result<Self> {
        if selectors.cards.is_empty() {
            return Err(ExtractError::InvalidSelector {
                selector: String::new(),
                reason: "at least one card selector is required".to_string(),
            });
        }
        Ok(Self {
            cards: compile(&selectors.cards.join(", "))?,
            links: compile_all(&selectors.links)?,
            titles: compile_all(&selectors.titles)?,
            prices: compile_all(&selectors.prices)?,
        })
    }

    /// Candidates found in a listing page fetched from `page_url`.
    ///
    /// Relative links are resolved against `page_url`; links that do not end
    /// up as http(s) URLs are dropped, as are repeats of a URL already seen on
    /// this page (nested cards often match twice).
    #[must_use]
    pub fn parse(&self, html: &str, page_url: &Url) -> Vec<ListingCandidate> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for card in document.select(&self.cards) {
            let Some((link, url)) = self.detail_link(&card, page_url) else {
                continue;
            };
            if !seen.insert(url.clone()) {
                continue;
            }
            candidates.push(ListingCandidate {
                title: self.title(&card, &link),
                price: self.price(&card),
                url,
            });
        }

        tracing::debug!(page = %page_url, candidates = candidates.len(), "listing page parsed");
        candidates
    }

    fn detail_link<'a>(&self, card: &ElementRef<'a>, page_url: &Url) -> Option<(ElementRef<'a>, String)> {
        let link = self
            .links
            .iter()
            .find_map(|selector| card.select(selector).next())?;
        let href = link.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }
        let url = page_url.join(href).ok()?;
        matches!(url.scheme(), "http" | "https").then(|| (link, url.to_string()))
    }

    /// Title element text, else link text; a short link text gives way to the card text.
    fn title(&self, card: &ElementRef<'_>, link: &ElementRef<'_>) -> String {
        let titled = self
            .titles
            .iter()
            .find_map(|selector| card.select(selector).next())
            .map(|el| element_text(&el))
            .filter(|text| !text.is_empty());
        if let Some(title) = titled {
            return title;
        }

        let title = element_text(link);
        if title.chars().count() < MIN_TITLE_CHARS {
            let text = element_text(card);
            if text.chars().count() > title.chars().count() {
                return text.chars().take(CARD_TEXT_TITLE_CHARS).collect();
            }
        }
        title
    }

    fn price(&self, card: &ElementRef<'_>) -> Option<String> {
        self.prices
            .iter()
            .filter_map(|selector| card.select(selector).next())
            .map(|el| element_text(&el))
            .find(|text| text.chars().any(|c| c.is_ascii_digit()))
    }
}

impl Default for ListingParser {
    fn default() -> Self {
        Self::new(&ListingSelectors::default()).unwrap_or_else(|e| panic!("default listing selectors: {e}"))
    }
}
