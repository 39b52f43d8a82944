//! Listing page URLs from section templates.

use crate::error::{Result, ScanError};
use habitat_site::definition::PAGE_PLACEHOLDER;
use url::Url;

/// URL of listing page `page` for a section template.
///
/// A template with a `{page}` placeholder gets it substituted. Otherwise any
/// existing `page` query parameter is replaced, or `page=<n>` is appended;
/// other query parameters keep their order.
pub fn build_page_url(template: &str, page: u32) -> Result<String> {
    let invalid = |reason: String| ScanError::InvalidPageUrl {
        template: template.to_string(),
        page,
        reason,
    };

    if template.contains(PAGE_PLACEHOLDER) {
        let url = template.replace(PAGE_PLACEHOLDER, &page.to_string());
        return Url::parse(&url)
            .map(String::from)
            .map_err(|e| invalid(e.to_string()));
    }

    let mut url = Url::parse(template).map_err(|e| invalid(e.to_string()))?;
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let page = page.to_string();
    let mut replaced = false;
    for (key, value) in &mut pairs {
        if key == "page" {
            value.clone_from(&page);
            replaced = true;
        }
    }
    if !replaced {
        pairs.push(("page".to_string(), page));
    }

    url.query_pairs_mut().clear().extend_pairs(pairs);
    Ok(url.into())
}
