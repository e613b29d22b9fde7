//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.
//! Timestamps are stored as fixed-width RFC 3339 UTC strings (microsecond
//! precision, `Z` suffix) so that comparing the text compares the instants.

use crate::state::QueueStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{DocumentFields, DocumentRecord, LinkRecord, QueueItem};
use crate::CrawlError;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const QUEUE_COLUMNS: &str =
    "id, url, source_url, depth, status, created_at, updated_at, last_error";

const DOCUMENT_COLUMNS: &str =
    "id, url, title, description, image_url, keywords, text, links, processed, created_at, updated_at";

/// Formats a timestamp for storage
pub(crate) fn to_db_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored timestamp
pub(crate) fn parse_db_time(s: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StorageError::Timestamp(format!("{}: {}", s, e)))
}

fn time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_db_time(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => parse_db_time(&raw)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

fn json_list_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn queue_item_from_row(row: &Row<'_>) -> rusqlite::Result<QueueItem> {
    let raw_status: String = row.get(4)?;
    let status = QueueStatus::from_db_string(&raw_status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            Type::Text,
            format!("unknown queue status '{}'", raw_status).into(),
        )
    })?;

    Ok(QueueItem {
        id: row.get(0)?,
        url: row.get(1)?,
        source_url: row.get(2)?,
        depth: row.get(3)?,
        status,
        created_at: time_column(row, 5)?,
        updated_at: time_column(row, 6)?,
        last_error: optional_time_column(row, 7)?,
    })
}

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentRecord> {
    Ok(DocumentRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        image_url: row.get(4)?,
        keywords: json_list_column(row, 5)?,
        text: row.get(6)?,
        links: json_list_column(row, 7)?,
        processed: row.get(8)?,
        created_at: time_column(row, 9)?,
        updated_at: time_column(row, 10)?,
    })
}

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CrawlError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CrawlError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, CrawlError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn query_queue_items(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Vec<QueueItem>> {
        let mut stmt = self.conn.prepare(sql)?;
        let items = stmt
            .query_map(params, queue_item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn document_id_by_url(&self, url: &str) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM search_data WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }
}

impl Storage for SqliteStorage {
    // ===== Queue Management =====

    fn insert_queue_item(
        &mut self,
        url: &str,
        source_url: Option<&str>,
        depth: u32,
        now: DateTime<Utc>,
    ) -> StorageResult<i64> {
        let ts = to_db_time(now);
        self.conn.execute(
            "INSERT INTO scrape_queue (url, source_url, depth, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![url, source_url, depth, QueueStatus::Pending.to_db_string(), ts],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_queue_item(&self, id: i64) -> StorageResult<QueueItem> {
        let sql = format!("SELECT {} FROM scrape_queue WHERE id = ?1", QUEUE_COLUMNS);
        self.conn
            .query_row(&sql, params![id], queue_item_from_row)
            .optional()?
            .ok_or(StorageError::QueueItemNotFound(id))
    }

    fn queue_contains_url(&self, url: &str) -> StorageResult<bool> {
        let exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM scrape_queue WHERE url = ?1 LIMIT 1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    fn pending_queue_items(&self) -> StorageResult<Vec<QueueItem>> {
        self.queue_items_by_status(QueueStatus::Pending)
    }

    fn claim_queue_item(&mut self, id: i64, now: DateTime<Utc>) -> StorageResult<bool> {
        // Compare-and-swap on status: a lost race changes zero rows
        let changed = self.conn.execute(
            "UPDATE scrape_queue SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
            params![
                QueueStatus::Processing.to_db_string(),
                to_db_time(now),
                id,
                QueueStatus::Pending.to_db_string()
            ],
        )?;
        Ok(changed == 1)
    }

    fn transition_queue_item(
        &mut self,
        id: i64,
        to: QueueStatus,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        let current = self.get_queue_item(id)?.status;
        if !current.can_transition_to(to) {
            return Err(StorageError::InvalidTransition {
                id,
                from: current,
                to,
            });
        }

        let changed = self.conn.execute(
            "UPDATE scrape_queue
             SET status = ?1,
                 updated_at = ?2,
                 last_error = CASE ?1 WHEN 'failed' THEN ?2 WHEN 'pending' THEN NULL ELSE last_error END
             WHERE id = ?3 AND status = ?4",
            params![to.to_db_string(), to_db_time(now), id, current.to_db_string()],
        )?;

        if changed == 0 {
            // Status moved underneath us between the read and the write
            let actual = self.get_queue_item(id)?.status;
            return Err(StorageError::InvalidTransition {
                id,
                from: actual,
                to,
            });
        }

        Ok(())
    }

    fn queue_items_by_status(&self, status: QueueStatus) -> StorageResult<Vec<QueueItem>> {
        let sql = format!(
            "SELECT {} FROM scrape_queue WHERE status = ?1 ORDER BY created_at, id",
            QUEUE_COLUMNS
        );
        self.query_queue_items(&sql, params![status.to_db_string()])
    }

    fn eligible_failed_items(
        &self,
        failed_before: DateTime<Utc>,
    ) -> StorageResult<Vec<QueueItem>> {
        let sql = format!(
            "SELECT {} FROM scrape_queue
             WHERE status = ?1 AND (last_error IS NULL OR last_error < ?2)
             ORDER BY created_at, id",
            QUEUE_COLUMNS
        );
        self.query_queue_items(
            &sql,
            params![QueueStatus::Failed.to_db_string(), to_db_time(failed_before)],
        )
    }

    fn has_failure_since(&self, url: &str, since: DateTime<Utc>) -> StorageResult<bool> {
        let exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM scrape_queue
                 WHERE url = ?1 AND status = ?2 AND last_error IS NOT NULL AND last_error > ?3
                 LIMIT 1",
                params![url, QueueStatus::Failed.to_db_string(), to_db_time(since)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    // ===== Document Management =====

    fn upsert_document(
        &mut self,
        url: &str,
        fields: &DocumentFields,
        now: DateTime<Utc>,
    ) -> StorageResult<i64> {
        let keywords = serde_json::to_string(&fields.keywords)?;
        let links = serde_json::to_string(&fields.links)?;

        self.conn.execute(
            "INSERT INTO search_data
                (url, title, description, image_url, keywords, text, links, processed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)
             ON CONFLICT(url) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                image_url = excluded.image_url,
                keywords = excluded.keywords,
                text = excluded.text,
                links = excluded.links,
                updated_at = excluded.updated_at",
            params![
                url,
                fields.title,
                fields.description,
                fields.image_url,
                keywords,
                fields.text,
                links,
                to_db_time(now)
            ],
        )?;

        self.document_id_by_url(url)?
            .ok_or_else(|| StorageError::DocumentNotFound(url.to_string()))
    }

    fn insert_placeholder_document(
        &mut self,
        url: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<i64> {
        let ts = to_db_time(now);
        self.conn.execute(
            "INSERT OR IGNORE INTO search_data (url, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![url, ts],
        )?;

        self.document_id_by_url(url)?
            .ok_or_else(|| StorageError::DocumentNotFound(url.to_string()))
    }

    fn get_document(&self, id: i64) -> StorageResult<DocumentRecord> {
        let sql = format!("SELECT {} FROM search_data WHERE id = ?1", DOCUMENT_COLUMNS);
        self.conn
            .query_row(&sql, params![id], document_from_row)
            .optional()?
            .ok_or_else(|| StorageError::DocumentNotFound(format!("Document ID {}", id)))
    }

    fn get_document_by_url(&self, url: &str) -> StorageResult<Option<DocumentRecord>> {
        let sql = format!("SELECT {} FROM search_data WHERE url = ?1", DOCUMENT_COLUMNS);
        let doc = self
            .conn
            .query_row(&sql, params![url], document_from_row)
            .optional()?;
        Ok(doc)
    }

    fn unprocessed_documents(&self) -> StorageResult<Vec<DocumentRecord>> {
        let sql = format!(
            "SELECT {} FROM search_data WHERE processed = 0 ORDER BY id",
            DOCUMENT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let docs = stmt
            .query_map([], document_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    fn mark_document_processed(&mut self, id: i64, now: DateTime<Utc>) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE search_data SET processed = 1, updated_at = ?1 WHERE id = ?2",
            params![to_db_time(now), id],
        )?;
        if changed == 0 {
            return Err(StorageError::DocumentNotFound(format!("Document ID {}", id)));
        }
        Ok(())
    }

    fn was_scraped_since(&self, url: &str, since: DateTime<Utc>) -> StorageResult<bool> {
        let exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM search_data WHERE url = ?1 AND processed = 1 AND updated_at > ?2 LIMIT 1",
                params![url, to_db_time(since)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    // ===== Link Management =====

    fn link_exists(&self, source_id: i64, target_id: i64) -> StorageResult<bool> {
        let exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM link_relations WHERE source_id = ?1 AND target_id = ?2 LIMIT 1",
                params![source_id, target_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(exists.is_some())
    }

    fn insert_link(
        &mut self,
        source_id: i64,
        target_id: i64,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO link_relations (source_id, target_id, created_at) VALUES (?1, ?2, ?3)",
            params![source_id, target_id, to_db_time(now)],
        )?;
        Ok(())
    }

    fn get_outgoing_links(&self, source_id: i64) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source_id, target_id, created_at FROM link_relations
             WHERE source_id = ?1 ORDER BY id",
        )?;

        let links = stmt
            .query_map(params![source_id], |row| {
                Ok(LinkRecord {
                    id: row.get(0)?,
                    source_id: row.get(1)?,
                    target_id: row.get(2)?,
                    created_at: time_column(row, 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    // ===== Statistics =====

    fn count_queue_by_status(&self) -> StorageResult<HashMap<QueueStatus, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM scrape_queue GROUP BY status")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut counts = HashMap::new();
        for (raw_status, count) in rows {
            match QueueStatus::from_db_string(&raw_status) {
                Some(status) => {
                    counts.insert(status, count as u64);
                }
                None => tracing::warn!("Ignoring unknown queue status '{}'", raw_status),
            }
        }

        Ok(counts)
    }

    fn count_documents(&self, processed: Option<bool>) -> StorageResult<u64> {
        let count: i64 = match processed {
            Some(flag) => self.conn.query_row(
                "SELECT COUNT(*) FROM search_data WHERE processed = ?1",
                params![flag],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM search_data", [], |row| row.get(0))?,
        };
        Ok(count as u64)
    }

    fn count_links(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM link_relations", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
