//! Database schema definitions
//!
//! Three tables: the crawl queue, the indexed documents, and the link graph
//! between documents.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Crawl queue; url is not unique, rows are never deleted
CREATE TABLE IF NOT EXISTS scrape_queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    source_url TEXT,
    depth INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    last_error TEXT
);

CREATE INDEX IF NOT EXISTS idx_scrape_queue_url ON scrape_queue(url);
CREATE INDEX IF NOT EXISTS idx_scrape_queue_status ON scrape_queue(status, created_at);

-- Indexed documents, one per normalized URL
CREATE TABLE IF NOT EXISTS search_data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    title TEXT,
    description TEXT,
    image_url TEXT,
    keywords TEXT NOT NULL DEFAULT '[]',
    text TEXT,
    links TEXT NOT NULL DEFAULT '[]',
    processed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_search_data_processed ON search_data(processed);

-- Directed document links
CREATE TABLE IF NOT EXISTS link_relations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id INTEGER NOT NULL REFERENCES search_data(id),
    target_id INTEGER NOT NULL REFERENCES search_data(id),
    created_at TEXT NOT NULL,
    UNIQUE(source_id, target_id)
);

CREATE INDEX IF NOT EXISTS idx_link_relations_target ON link_relations(target_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
