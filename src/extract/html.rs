use crate::error::{Result, ScrapeError};
use crate::results::RawEntry;
use scraper::{Html, Selector};
use url::Url;

/// Collects raw entries from a saved people page
///
/// Mirrors the in-page script: every node matching `selector` yields its
/// whitespace-collapsed text and its `href` resolved against `base_url`.
/// Nodes without text or without an `href` are left out.
pub fn parse_entries(html: &str, selector: &str, base_url: &str) -> Result<Vec<RawEntry>> {
    let selector = Selector::parse(selector)
        .map_err(|e| ScrapeError::Configuration(format!("invalid selector '{}': {}", selector, e)))?;
    let base = Url::parse(base_url)
        .map_err(|e| ScrapeError::Configuration(format!("invalid base URL '{}': {}", base_url, e)))?;

    let doc = Html::parse_document(html);
    let entries = doc
        .select(&selector)
        .filter_map(|node| {
            let text = node.text().collect::<String>();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                return None;
            }
            let href = node.value().attr("href")?;
            let resolved = base
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string());
            Some(RawEntry::new(text, resolved))
        })
        .collect::<Vec<_>>();

    ::log::debug!("HTML extractor found {} entries", entries.len());
    Ok(entries)
}
