//! Small helpers over `scraper` element trees.

use scraper::{ElementRef, Selector};

/// Text of `element` with each text node trimmed and joined by single spaces.
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a selector that is part of this crate's source.
pub(crate) fn static_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("built-in selector '{css}' is invalid: {e}"))
}

/// Next sibling element named `name`, skipping text and other elements.
pub(crate) fn next_sibling_named<'a>(element: &ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == name)
}
