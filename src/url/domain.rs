use super::normalize::parse_crawlable_url;
use url::Url;

/// Extracts the lowercase host from a parsed URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use navigate_crawler::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Extracts the hostname from a URL string, or `None` if the URL is not crawlable
pub fn hostname_of(url_str: &str) -> Option<String> {
    parse_crawlable_url(url_str)
        .ok()
        .and_then(|url| extract_domain(&url))
}
