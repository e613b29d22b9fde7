//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - The crawl queue and its status column
//! - Indexed documents, one per normalized URL
//! - Link relationships between documents

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::QueueStatus;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(CrawlError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, CrawlError> {
    SqliteStorage::new(path)
}

/// One crawl task in the queue
#[derive(Debug, Clone, PartialEq)]
pub struct QueueItem {
    pub id: i64,
    pub url: String,
    pub source_url: Option<String>,
    pub depth: u32,
    pub status: QueueStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_error: Option<DateTime<Utc>>,
}

/// An indexed document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    pub id: i64,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub keywords: Vec<String>,
    pub text: Option<String>,
    pub links: Vec<String>,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Extracted fields written to a document, already capped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub keywords: Vec<String>,
    pub text: Option<String>,
    pub links: Vec<String>,
}

impl DocumentFields {
    /// Returns true if at least one field is non-empty
    pub fn has_data(&self) -> bool {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.is_empty());

        present(&self.title)
            || present(&self.description)
            || present(&self.image_url)
            || present(&self.text)
            || !self.keywords.is_empty()
            || !self.links.is_empty()
    }
}

/// Represents a link relationship between documents
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub id: i64,
    pub source_id: i64,
    pub target_id: i64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_have_no_data() {
        assert!(!DocumentFields::default().has_data());

        let blank = DocumentFields {
            title: Some(String::new()),
            text: Some(String::new()),
            ..Default::default()
        };
        assert!(!blank.has_data());
    }

    #[test]
    fn test_any_field_counts_as_data() {
        let titled = DocumentFields {
            title: Some("Home".to_string()),
            ..Default::default()
        };
        assert!(titled.has_data());

        let linked = DocumentFields {
            links: vec!["https://example.com/".to_string()],
            ..Default::default()
        };
        assert!(linked.has_data());

        let tagged = DocumentFields {
            keywords: vec!["rust".to_string()],
            ..Default::default()
        };
        assert!(tagged.has_data());
    }
}
