//! URL handling module for the crawler
//!
//! This module provides URL validation, normalization into identity keys,
//! hostname extraction, and resource-kind classification.

mod classify;
mod domain;
mod normalize;

// Re-export main functions
pub use classify::{
    analyze_url, classify_url, is_archive_url, is_code_url, is_data_url, is_document_url,
    is_file_url, is_image_url, is_media_url, ResourceKind, UrlAnalysis,
};
pub use domain::{extract_domain, hostname_of};
pub use normalize::{is_valid_url, normalize_url, parse_crawlable_url};
