//! HTML content extraction
//!
//! This module turns raw markup into the fields stored on a document:
//! - Title (whitespace collapsed)
//! - Meta description, Open Graph image and meta keywords
//! - Visible body text
//! - Outbound links worth crawling

use crate::config::ExtractConfig;
use crate::url::{is_file_url, is_image_url, parse_crawlable_url};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Elements whose text never counts as body content
const EXCLUDED_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "img", "header", "footer", "nav", "video", "audio",
    "iframe", "object", "embed", "source", "track",
];

/// Elements that start a new line in the extracted text
const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "section", "article", "main", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5",
    "h6", "tr", "td", "th", "br", "blockquote", "pre", "table",
];

/// Path fragments of directories that serve assets rather than pages
const MEDIA_DIRECTORY_PATTERNS: &[&str] = &[
    "/images/",
    "/img/",
    "/media/",
    "/assets/",
    "/static/",
    "/cdn/",
    "/uploads/",
    "/files/",
    "/downloads/",
    "/content/",
    "/resources/",
];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Cannot resolve links against {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

/// Structured fields extracted from one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Raw comma-separated meta keywords
    pub keywords: Option<String>,
    pub text: String,
    /// Absolute, filtered outbound links in document order
    pub links: Vec<String>,
}

/// Turns markup into structured page fields
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, html: &str, page_url: &str) -> Result<ExtractedPage, ExtractError>;
}

/// scraper-backed extractor
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    max_links: usize,
    max_text_chars: usize,
    max_description_chars: usize,
}

impl HtmlExtractor {
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            max_links: config.max_links,
            max_text_chars: config.max_text_chars,
            max_description_chars: config.max_description_chars,
        }
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new(&ExtractConfig::default())
    }
}

impl ContentExtractor for HtmlExtractor {
    /// Parses HTML content and extracts document fields
    ///
    /// # Link Extraction Rules
    ///
    /// **Include:**
    /// - `<a href="...">` tags, resolved against the page URL
    ///
    /// **Exclude:**
    /// - `javascript:`, `mailto:`, `tel:`, `data:` and fragment-only links
    /// - Non-HTTP(S) URLs after resolution
    /// - URLs classified as files or images
    /// - URLs under asset directories such as `/images/` or `/cdn/`
    ///
    /// Only the first `max_links` surviving links are kept.
    fn extract(&self, html: &str, page_url: &str) -> Result<ExtractedPage, ExtractError> {
        let base_url = Url::parse(page_url).map_err(|e| ExtractError::InvalidBaseUrl {
            url: page_url.to_string(),
            message: e.to_string(),
        })?;

        let document = Html::parse_document(html);

        let description = meta_content(&document, r#"meta[name="description"]"#)
            .map(|d| truncate_chars(&d, self.max_description_chars));

        let text = truncate_chars(&extract_body_text(&document), self.max_text_chars);

        let links = extract_links(&document, &base_url)
            .into_iter()
            .filter(|link| is_crawlable_link(link))
            .take(self.max_links)
            .collect();

        Ok(ExtractedPage {
            title: extract_title(&document),
            description,
            image_url: meta_content(&document, r#"meta[property="og:image"]"#),
            keywords: meta_content(&document, r#"meta[name="keywords"]"#),
            text,
            links,
        })
    }
}

/// Cuts `s` to `max_chars` characters, appending `...` when anything was cut
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Reads the trimmed `content` attribute of the first element matching `selector`
fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects visible text under `<body>`, skipping non-content elements
fn extract_body_text(document: &Html) -> String {
    let Ok(body_selector) = Selector::parse("body") else {
        return String::new();
    };
    let Some(body) = document.select(&body_selector).next() else {
        return String::new();
    };

    let mut out = String::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let excluded = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| EXCLUDED_TEXT_ELEMENTS.contains(&el.name()))
        });
        if excluded {
            continue;
        }

        let chunk = collapse_whitespace(text);
        if chunk.is_empty() {
            continue;
        }

        let starts_block = node
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|el| BLOCK_ELEMENTS.contains(&el.value().name()));

        if !out.is_empty() {
            out.push(if starts_block { '\n' } else { ' ' });
        }
        out.push_str(&chunk);
    }

    out
}

/// Extracts all resolvable links from `<a href>` tags
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    // Skip empty hrefs
    if href.is_empty() {
        return None;
    }

    // Skip special schemes
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    // Skip fragment-only links (same page anchors)
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}

/// Returns true if a resolved link looks like a crawlable page
fn is_crawlable_link(link: &str) -> bool {
    let Ok(url) = parse_crawlable_url(link) else {
        return false;
    };

    if is_file_url(link) || is_image_url(link) {
        return false;
    }

    let path = url.path().to_ascii_lowercase();
    !MEDIA_DIRECTORY_PATTERNS
        .iter()
        .any(|pattern| path.contains(pattern))
}
