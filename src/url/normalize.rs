use crate::{UrlError, UrlResult};
use url::Url;

/// Parses a URL string and checks that it is crawlable
///
/// # Validation Rules
///
/// 1. The string must parse as an absolute URL
/// 2. The scheme must be `http` or `https`
/// 3. The hostname must be present and non-empty
/// 4. The hostname must contain neither `..` nor `//`
///
/// # Arguments
///
/// * `url_str` - The URL string to parse
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlError)` - The URL is not crawlable
pub fn parse_crawlable_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host,
        _ => return Err(UrlError::MissingDomain),
    };

    if host.contains("..") || host.contains("//") {
        return Err(UrlError::Malformed(format!("Suspicious hostname: {}", host)));
    }

    Ok(url)
}

/// Returns true if the string is an absolute http(s) URL with a sane hostname
///
/// # Examples
///
/// ```
/// use navigate_crawler::url::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/page"));
/// assert!(!is_valid_url("ftp://example.com/file"));
/// assert!(!is_valid_url("/relative/path"));
/// ```
pub fn is_valid_url(url_str: &str) -> bool {
    parse_crawlable_url(url_str).is_ok()
}

/// Normalizes a URL into the identity key used for documents and queue dedup
///
/// # Normalization Steps
///
/// 1. Parse and validate the URL; return the input unchanged if invalid
/// 2. Remove the fragment (everything after #)
/// 3. Remove the query string
///
/// Host lowercasing and default-port removal come from the URL parser itself.
///
/// # Examples
///
/// ```
/// use navigate_crawler::url::normalize_url;
///
/// assert_eq!(
///     normalize_url("https://Example.com/page?utm_source=x#top"),
///     "https://example.com/page"
/// );
/// assert_eq!(normalize_url("not a url"), "not a url");
/// ```
pub fn normalize_url(url_str: &str) -> String {
    match parse_crawlable_url(url_str) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.set_query(None);
            url.to_string()
        }
        Err(_) => url_str.to_string(),
    }
}
