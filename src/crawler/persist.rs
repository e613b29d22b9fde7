//! Document persistence rules
//!
//! Turns an extracted page into capped document fields, writes it, and
//! resolves link targets to document ids (creating placeholders when needed).

use crate::config::StorageConfig;
use crate::crawler::parser::ExtractedPage;
use crate::storage::{DocumentFields, Storage, StorageResult};
use crate::url::{is_image_url, is_valid_url};
use chrono::{DateTime, Utc};

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Splits a raw meta keywords value into trimmed, non-empty entries
///
/// # Example
///
/// ```
/// use navigate_crawler::crawler::split_keywords;
///
/// assert_eq!(split_keywords("rust, web ,, crawler", 2), vec!["rust", "web"]);
/// ```
pub fn split_keywords(raw: &str, max_keywords: usize) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .take(max_keywords)
        .map(|k| k.to_string())
        .collect()
}

/// Builds the stored fields for an extracted page, applying the storage caps
pub fn document_fields(page: &ExtractedPage, limits: &StorageConfig) -> DocumentFields {
    let keywords = page
        .keywords
        .as_deref()
        .map(|raw| split_keywords(raw, limits.max_keywords))
        .unwrap_or_default();

    let links = page
        .links
        .iter()
        .filter(|link| is_valid_url(link) && !is_image_url(link))
        .take(limits.max_stored_links)
        .cloned()
        .collect();

    let text = page.text.trim();

    DocumentFields {
        title: non_empty(&page.title),
        description: non_empty(&page.description),
        image_url: non_empty(&page.image_url),
        keywords,
        text: (!text.is_empty()).then(|| text.to_string()),
        links,
    }
}

/// Upserts the document for `url` if the page produced any usable data
///
/// # Returns
///
/// * `Ok(Some(id))` - The document id
/// * `Ok(None)` - Nothing worth storing; no row was written
pub fn save_scrape_result(
    storage: &mut dyn Storage,
    limits: &StorageConfig,
    url: &str,
    page: &ExtractedPage,
    now: DateTime<Utc>,
) -> StorageResult<Option<i64>> {
    let fields = document_fields(page, limits);
    if !fields.has_data() {
        tracing::debug!("No usable data extracted from {}", url);
        return Ok(None);
    }

    storage.upsert_document(url, &fields, now).map(Some)
}

/// Resolves a normalized link to its document id, inserting a placeholder if needed
pub fn resolve_link_target(
    storage: &mut dyn Storage,
    url: &str,
    now: DateTime<Utc>,
) -> StorageResult<i64> {
    match storage.get_document_by_url(url)? {
        Some(document) => Ok(document.id),
        None => storage.insert_placeholder_document(url, now),
    }
}
