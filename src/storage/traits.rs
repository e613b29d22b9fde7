//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::QueueStatus;
use crate::storage::{DocumentFields, DocumentRecord, LinkRecord, QueueItem};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Queue item not found: {0}")]
    QueueItemNotFound(i64),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Invalid queue transition for item {id}: {from} -> {to}")]
    InvalidTransition {
        id: i64,
        from: QueueStatus,
        to: QueueStatus,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid timestamp in database: {0}")]
    Timestamp(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all durable operations needed by the crawler. Every
/// method is an independent statement; no transaction spans several calls.
/// Timestamps are passed in by the caller so that all time comes from one clock.
pub trait Storage {
    // ===== Queue Management =====

    /// Inserts a new pending queue item
    ///
    /// # Arguments
    ///
    /// * `url` - The normalized URL
    /// * `source_url` - The page the URL was discovered on, if any
    /// * `depth` - Hops from a seed
    /// * `now` - Creation timestamp
    ///
    /// # Returns
    ///
    /// The ID of the new queue item
    fn insert_queue_item(
        &mut self,
        url: &str,
        source_url: Option<&str>,
        depth: u32,
        now: DateTime<Utc>,
    ) -> StorageResult<i64>;

    /// Gets a queue item by ID
    fn get_queue_item(&self, id: i64) -> StorageResult<QueueItem>;

    /// Returns true if any queue row exists for the URL, whatever its status
    fn queue_contains_url(&self, url: &str) -> StorageResult<bool>;

    /// Gets all pending items, oldest first
    fn pending_queue_items(&self) -> StorageResult<Vec<QueueItem>>;

    /// Atomically flips a pending item to processing
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - This caller now owns the item
    /// * `Ok(false)` - The item was no longer pending
    fn claim_queue_item(&mut self, id: i64, now: DateTime<Utc>) -> StorageResult<bool>;

    /// Moves an item along the queue state machine
    ///
    /// Moving to `Failed` stamps `last_error` with `now`; moving back to
    /// `Pending` clears it.
    ///
    /// # Errors
    ///
    /// * `StorageError::InvalidTransition` - The move is not allowed from the current status
    fn transition_queue_item(
        &mut self,
        id: i64,
        to: QueueStatus,
        now: DateTime<Utc>,
    ) -> StorageResult<()>;

    /// Gets all items with the given status, oldest first
    fn queue_items_by_status(&self, status: QueueStatus) -> StorageResult<Vec<QueueItem>>;

    /// Gets failed items whose last error is absent or strictly older than `failed_before`
    fn eligible_failed_items(&self, failed_before: DateTime<Utc>)
        -> StorageResult<Vec<QueueItem>>;

    /// Returns true if the URL has a failed row whose last error is after `since`
    fn has_failure_since(&self, url: &str, since: DateTime<Utc>) -> StorageResult<bool>;

    // ===== Document Management =====

    /// Inserts or updates the document for a URL with freshly extracted fields
    ///
    /// The `processed` flag of an existing row is left untouched.
    ///
    /// # Returns
    ///
    /// The document ID
    fn upsert_document(
        &mut self,
        url: &str,
        fields: &DocumentFields,
        now: DateTime<Utc>,
    ) -> StorageResult<i64>;

    /// Inserts an empty, unprocessed document for the URL unless one exists
    ///
    /// # Returns
    ///
    /// The ID of the new or existing document
    fn insert_placeholder_document(&mut self, url: &str, now: DateTime<Utc>)
        -> StorageResult<i64>;

    /// Gets a document by ID
    fn get_document(&self, id: i64) -> StorageResult<DocumentRecord>;

    /// Gets a document by normalized URL
    fn get_document_by_url(&self, url: &str) -> StorageResult<Option<DocumentRecord>>;

    /// Gets all documents whose links have not been processed yet
    fn unprocessed_documents(&self) -> StorageResult<Vec<DocumentRecord>>;

    /// Sets `processed = true` on a document
    fn mark_document_processed(&mut self, id: i64, now: DateTime<Utc>) -> StorageResult<()>;

    /// Returns true if the URL has a processed document updated after `since`
    fn was_scraped_since(&self, url: &str, since: DateTime<Utc>) -> StorageResult<bool>;

    // ===== Link Management =====

    /// Returns true if the edge already exists
    fn link_exists(&self, source_id: i64, target_id: i64) -> StorageResult<bool>;

    /// Inserts an edge between two documents
    fn insert_link(&mut self, source_id: i64, target_id: i64, now: DateTime<Utc>)
        -> StorageResult<()>;

    /// Gets all edges leaving a document
    fn get_outgoing_links(&self, source_id: i64) -> StorageResult<Vec<LinkRecord>>;

    // ===== Statistics =====

    /// Counts queue items per status (statuses with no rows are omitted)
    fn count_queue_by_status(&self) -> StorageResult<HashMap<QueueStatus, u64>>;

    /// Counts documents, optionally filtered by the processed flag
    fn count_documents(&self, processed: Option<bool>) -> StorageResult<u64>;

    /// Counts all link relations
    fn count_links(&self) -> StorageResult<u64>;
}
