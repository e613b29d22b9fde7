//! Resource-kind heuristics for URLs
//!
//! A URL is classified by four independent signals: the file extension of its
//! path, the MIME type inferred from that extension, keyword heuristics over
//! its path segments, and `format=`/`type=`/`content=` query hints. Any one
//! signal is enough to classify. The result is advisory and used only to keep
//! non-HTML resources out of the crawl queue.

use super::normalize::parse_crawlable_url;
use std::collections::HashMap;
use std::fmt;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "svg", "ico", "bmp", "tiff", "tif", "avif", "heic",
    "heif", "jfif", "pjpeg", "pjp",
];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "odt", "ods", "odp",
];

const MEDIA_EXTENSIONS: &[&str] = &[
    "mp3", "mp4", "wav", "avi", "mov", "wmv", "flv", "mkv", "webm", "ogg",
];

const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz", "bz2"];

const CODE_EXTENSIONS: &[&str] = &[
    "js", "css", "php", "py", "java", "c", "cpp", "h", "cs", "rb", "go", "rs",
];

const DATA_EXTENSIONS: &[&str] = &["json", "xml", "csv", "sql", "db", "sqlite", "sqlite3"];

const OTHER_EXTENSIONS: &[&str] = &["exe", "dll", "so", "dylib", "bin", "dat", "iso", "img"];

/// Path segment keywords that suggest a URL serves a file rather than a page
const FILE_PATH_KEYWORDS: &[&str] = &[
    "images",
    "img",
    "media",
    "assets",
    "static",
    "cdn",
    "uploads",
    "files",
    "downloads",
    "content",
    "resources",
    "docs",
    "documents",
    "pdfs",
    "videos",
    "audio",
    "music",
    "archives",
    "code",
    "scripts",
    "data",
    "binaries",
    "executables",
    "installers",
    "packages",
];

const QUERY_HINT_KEYS: &[&str] = &["format", "type", "content"];

/// Kind of resource a URL appears to point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Image,
    Document,
    Media,
    Archive,
    Code,
    Data,
    Other,
}

impl ResourceKind {
    /// All kinds in classification priority order
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Image,
            ResourceKind::Document,
            ResourceKind::Media,
            ResourceKind::Archive,
            ResourceKind::Code,
            ResourceKind::Data,
            ResourceKind::Other,
        ]
    }

    fn from_extension(ext: &str) -> Option<Self> {
        let table: [(&[&str], ResourceKind); 7] = [
            (IMAGE_EXTENSIONS, ResourceKind::Image),
            (DOCUMENT_EXTENSIONS, ResourceKind::Document),
            (MEDIA_EXTENSIONS, ResourceKind::Media),
            (ARCHIVE_EXTENSIONS, ResourceKind::Archive),
            (CODE_EXTENSIONS, ResourceKind::Code),
            (DATA_EXTENSIONS, ResourceKind::Data),
            (OTHER_EXTENSIONS, ResourceKind::Other),
        ];

        table
            .iter()
            .find(|(exts, _)| exts.contains(&ext))
            .map(|(_, kind)| *kind)
    }

    fn from_mime(mime: &str) -> Option<Self> {
        let contains_any = |needles: &[&str]| needles.iter().any(|n| mime.contains(n));

        if mime.starts_with("image/") {
            return Some(ResourceKind::Image);
        }
        if mime.starts_with("audio/") || mime.starts_with("video/") {
            return Some(ResourceKind::Media);
        }
        if mime.starts_with("application/") {
            if contains_any(&["pdf", "word", "excel", "powerpoint", "rtf", "officedocument"]) {
                return Some(ResourceKind::Document);
            }
            if contains_any(&["zip", "rar", "7z", "tar", "gzip"]) {
                return Some(ResourceKind::Archive);
            }
            if contains_any(&[
                "javascript", "css", "php", "python", "java", "c++", "ruby", "go", "rust",
            ]) {
                return Some(ResourceKind::Code);
            }
            if contains_any(&["json", "xml", "csv", "sql"]) {
                return Some(ResourceKind::Data);
            }
            if !mime.contains("html") {
                return Some(ResourceKind::Other);
            }
            return None;
        }
        if mime.starts_with("text/") && !mime.contains("html") && !mime.contains("xml") {
            return Some(ResourceKind::Document);
        }
        None
    }

    /// Picks a kind from path segments, checking every segment per kind
    /// before falling through to the next kind
    fn from_path_segments(segments: &[String]) -> Self {
        let table: [(&[&str], ResourceKind); 6] = [
            (&["images", "img", "photos", "pictures"], ResourceKind::Image),
            (&["media", "videos", "audio", "music"], ResourceKind::Media),
            (&["docs", "documents", "pdfs"], ResourceKind::Document),
            (&["archives", "downloads"], ResourceKind::Archive),
            (&["code", "scripts", "src"], ResourceKind::Code),
            (&["data", "datasets"], ResourceKind::Data),
        ];

        table
            .iter()
            .find(|(needles, _)| {
                segments
                    .iter()
                    .any(|segment| needles.iter().any(|n| segment.contains(n)))
            })
            .map(|(_, kind)| *kind)
            .unwrap_or(ResourceKind::Other)
    }

    fn from_query_hint(value: &str) -> Self {
        match value {
            "image" => ResourceKind::Image,
            "pdf" => ResourceKind::Document,
            "media" => ResourceKind::Media,
            "archive" => ResourceKind::Archive,
            "code" => ResourceKind::Code,
            "data" => ResourceKind::Data,
            _ => ResourceKind::Other,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Image => "image",
            ResourceKind::Document => "document",
            ResourceKind::Media => "media",
            ResourceKind::Archive => "archive",
            ResourceKind::Code => "code",
            ResourceKind::Data => "data",
            ResourceKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Full classification report for a URL
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlAnalysis {
    /// Whether any signal marked the URL as a downloadable file
    pub is_file: bool,
    /// Every kind that at least one signal fired for, deduplicated and sorted
    pub kinds: Vec<ResourceKind>,
    /// Lowercased path extension, if any
    pub file_type: Option<String>,
    /// MIME type inferred from the extension
    pub mime_type: Option<String>,
    /// Non-empty path segments
    pub path_components: Vec<String>,
    /// Query parameters (last value wins for repeated keys)
    pub query_params: HashMap<String, String>,
}

impl UrlAnalysis {
    /// Returns true if any signal classified the URL as `kind`
    pub fn is(&self, kind: ResourceKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Highest-priority kind, or `None` if the URL looks like a plain page
    pub fn primary_kind(&self) -> Option<ResourceKind> {
        ResourceKind::all().iter().copied().find(|k| self.is(*k))
    }

    fn mark(&mut self, kind: ResourceKind) {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
            self.kinds.sort();
        }
    }
}

/// Extracts the trailing extension of a URL path (`/a/b.JPG` → `jpg`)
fn path_extension(path: &str) -> Option<String> {
    let (_, ext) = path.rsplit_once('.')?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Runs every classification signal over a URL
///
/// Invalid URLs produce an empty analysis (not classified).
pub fn analyze_url(url_str: &str) -> UrlAnalysis {
    let mut analysis = UrlAnalysis::default();

    let url = match parse_crawlable_url(url_str) {
        Ok(url) => url,
        Err(_) => return analysis,
    };

    let path = url.path().to_string();
    analysis.path_components = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    analysis.query_params = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    // Extension and inferred MIME type
    if let Some(ext) = path_extension(&path) {
        if let Some(kind) = ResourceKind::from_extension(&ext) {
            analysis.is_file = true;
            analysis.mark(kind);
        }

        if let Some(mime) = mime_guess::from_ext(&ext).first() {
            let mime = mime.essence_str().to_string();
            if let Some(kind) = ResourceKind::from_mime(&mime) {
                analysis.is_file = true;
                analysis.mark(kind);
            }
            analysis.mime_type = Some(mime);
        }

        analysis.file_type = Some(ext);
    }

    // Path segment keywords
    let segments: Vec<String> = analysis
        .path_components
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    if segments
        .iter()
        .any(|segment| FILE_PATH_KEYWORDS.iter().any(|k| segment.contains(k)))
    {
        analysis.is_file = true;
        analysis.mark(ResourceKind::from_path_segments(&segments));
    }

    // Query parameter hints
    for key in QUERY_HINT_KEYS {
        let hint = analysis
            .query_params
            .get(*key)
            .filter(|v| !v.is_empty())
            .map(|v| ResourceKind::from_query_hint(v));
        if let Some(kind) = hint {
            analysis.is_file = true;
            analysis.mark(kind);
        }
    }

    analysis
}

/// Classifies a URL by its highest-priority resource kind
///
/// # Examples
///
/// ```
/// use navigate_crawler::url::{classify_url, ResourceKind};
///
/// assert_eq!(classify_url("https://example.com/logo.png"), Some(ResourceKind::Image));
/// assert_eq!(classify_url("https://example.com/about"), None);
/// ```
pub fn classify_url(url_str: &str) -> Option<ResourceKind> {
    analyze_url(url_str).primary_kind()
}

pub fn is_image_url(url_str: &str) -> bool {
    analyze_url(url_str).is(ResourceKind::Image)
}

pub fn is_file_url(url_str: &str) -> bool {
    analyze_url(url_str).is_file
}

pub fn is_media_url(url_str: &str) -> bool {
    analyze_url(url_str).is(ResourceKind::Media)
}

pub fn is_document_url(url_str: &str) -> bool {
    analyze_url(url_str).is(ResourceKind::Document)
}

pub fn is_archive_url(url_str: &str) -> bool {
    analyze_url(url_str).is(ResourceKind::Archive)
}

pub fn is_code_url(url_str: &str) -> bool {
    analyze_url(url_str).is(ResourceKind::Code)
}

pub fn is_data_url(url_str: &str) -> bool {
    analyze_url(url_str).is(ResourceKind::Data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_pages_are_not_classified() {
        assert_eq!(classify_url("https://example.com/"), None);
        assert_eq!(classify_url("https://example.com/about"), None);
        assert_eq!(classify_url("https://example.com/blog/post-1"), None);
        assert_eq!(classify_url("https://example.com/index.html"), None);
        assert!(!is_file_url("https://example.com/a"));
    }

    #[test]
    fn test_image_extensions() {
        assert!(is_image_url("https://example.com/b.jpg"));
        assert!(is_image_url("https://example.com/photo.JPEG"));
        assert!(is_image_url("https://example.com/icon.svg"));
        assert!(is_image_url("https://example.com/pic.avif?size=large"));
        assert!(is_file_url("https://example.com/b.jpg"));
    }

    #[test]
    fn test_extension_categories() {
        assert!(is_document_url("https://example.com/report.pdf"));
        assert!(is_media_url("https://example.com/song.mp3"));
        assert!(is_archive_url("https://example.com/bundle.zip"));
        assert!(is_code_url("https://example.com/app.js"));
        assert!(is_data_url("https://example.com/feed.json"));
        assert_eq!(
            classify_url("https://example.com/setup.exe"),
            Some(ResourceKind::Other)
        );
    }

    #[test]
    fn test_extension_must_be_trailing() {
        assert_eq!(path_extension("/v1.2/page"), None);
        assert_eq!(path_extension("/a/b.PNG"), Some("png".to_string()));
        assert_eq!(path_extension("/trailing."), None);
    }

    #[test]
    fn test_path_segment_heuristics() {
        assert!(is_image_url("https://example.com/images/header"));
        assert!(is_media_url("https://example.com/media/clip"));
        assert!(is_document_url("https://example.com/docs/guide"));
        assert!(is_archive_url("https://example.com/downloads/latest"));
        assert_eq!(
            classify_url("https://example.com/uploads/x"),
            Some(ResourceKind::Other)
        );
    }

    #[test]
    fn test_secondary_keywords_apply_across_segments() {
        assert!(is_image_url("https://example.com/static/photos/cat"));
        assert!(is_image_url("https://example.com/pictures/cdn/cat"));
        assert_eq!(
            classify_url("https://example.com/assets/src/x"),
            Some(ResourceKind::Code)
        );
        assert_eq!(
            classify_url("https://example.com/uploads/datasets/2024"),
            Some(ResourceKind::Data)
        );
        // Secondary keywords alone do not mark a file
        assert!(!is_file_url("https://example.com/photos/cat"));
        assert!(!is_file_url("https://example.com/src/main"));
    }

    #[test]
    fn test_segment_kind_follows_priority_not_position() {
        let analysis = analyze_url("https://example.com/scripts/img/x");
        assert!(analysis.is_file);
        assert_eq!(analysis.kinds, vec![ResourceKind::Image]);
    }

    #[test]
    fn test_query_hints() {
        assert!(is_image_url("https://example.com/render?format=image"));
        assert!(is_document_url("https://example.com/export?type=pdf"));
        assert_eq!(
            classify_url("https://example.com/view?content=html"),
            Some(ResourceKind::Other)
        );
        assert!(!is_file_url("https://example.com/search?q=images"));
    }

    #[test]
    fn test_invalid_urls_fail_safe() {
        assert_eq!(classify_url("not a url"), None);
        assert!(!is_image_url("ftp://example.com/a.png"));
        assert_eq!(analyze_url("::"), UrlAnalysis::default());
    }

    #[test]
    fn test_analysis_details() {
        let analysis = analyze_url("https://example.com/files/report.pdf?lang=en");
        assert!(analysis.is_file);
        assert_eq!(analysis.file_type.as_deref(), Some("pdf"));
        assert_eq!(analysis.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(analysis.path_components, vec!["files", "report.pdf"]);
        assert_eq!(analysis.query_params.get("lang").map(String::as_str), Some("en"));
        assert_eq!(analysis.primary_kind(), Some(ResourceKind::Document));
    }

    #[test]
    fn test_multiple_signals_keep_priority() {
        let analysis = analyze_url("https://example.com/images/manual.pdf");
        assert!(analysis.is(ResourceKind::Image));
        assert!(analysis.is(ResourceKind::Document));
        assert_eq!(analysis.primary_kind(), Some(ResourceKind::Image));
    }
}
