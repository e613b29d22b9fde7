//! Queue policy on top of the storage layer
//!
//! This module decides what may enter the crawl queue and in which order
//! items leave it:
//! - Enqueue rules (validity, images, recrawl window, retry backoff, dedup)
//! - Dequeue with per-host cooldown and an atomic claim
//! - Retry sweep for failed items
//! - Backfill of unprocessed documents
//! - Recovery of items left in `processing` by an interrupted run

use crate::config::CrawlerConfig;
use crate::crawler::scheduler::PolitenessScheduler;
use crate::state::QueueStatus;
use crate::storage::{QueueItem, Storage, StorageResult};
use crate::url::{is_image_url, is_valid_url, normalize_url};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Backfilled documents always re-enter at this depth
pub const BACKFILL_DEPTH: u32 = 1;

/// Adds a URL to the crawl queue
///
/// The URL is rejected when it is invalid, classified as an image, was
/// scraped within the recrawl window, failed within the retry backoff, or
/// already has any queue row at all.
///
/// # Returns
///
/// * `Ok(true)` - A new pending item was inserted
/// * `Ok(false)` - The URL was rejected
pub fn add_to_queue(
    storage: &mut dyn Storage,
    config: &CrawlerConfig,
    url: &str,
    source_url: Option<&str>,
    depth: u32,
    now: DateTime<Utc>,
) -> StorageResult<bool> {
    if !is_valid_url(url) {
        tracing::warn!("Skipping invalid URL: {}", url);
        return Ok(false);
    }

    if is_image_url(url) {
        tracing::debug!("Skipping image URL: {}", url);
        return Ok(false);
    }

    let source_url = match source_url {
        Some(source) if is_valid_url(source) => Some(source),
        Some(source) => {
            tracing::warn!("Dropping invalid source URL {} for {}", source, url);
            None
        }
        None => None,
    };

    let normalized = normalize_url(url);

    if storage.was_scraped_since(&normalized, now - config.recrawl_window())? {
        tracing::debug!("Recently scraped, not queueing: {}", normalized);
        return Ok(false);
    }

    if storage.has_failure_since(&normalized, now - config.retry_backoff())? {
        tracing::debug!("Recently failed, not queueing: {}", normalized);
        return Ok(false);
    }

    if storage.queue_contains_url(&normalized)? {
        tracing::debug!("Already queued: {}", normalized);
        return Ok(false);
    }

    storage.insert_queue_item(&normalized, source_url, depth, now)?;
    tracing::debug!("Queued {} at depth {}", normalized, depth);
    Ok(true)
}

/// Claims the oldest pending item whose host is not cooling down
///
/// # Returns
///
/// * `Ok(Some(item))` - The claimed item, now `processing`
/// * `Ok(None)` - Nothing pending, or every pending host is in cooldown
pub fn next_from_queue(
    storage: &mut dyn Storage,
    scheduler: &PolitenessScheduler,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> StorageResult<Option<QueueItem>> {
    for item in storage.pending_queue_items()? {
        if scheduler.is_in_cooldown(&item.url, cooldown) {
            continue;
        }

        if storage.claim_queue_item(item.id, now)? {
            return storage.get_queue_item(item.id).map(Some);
        }

        tracing::debug!("Lost claim on queue item {}", item.id);
    }

    Ok(None)
}

/// Resets failed items whose backoff has elapsed to pending
///
/// Items without a recorded error time are always eligible.
///
/// # Returns
///
/// Number of items reset
pub fn reset_eligible_failed(
    storage: &mut dyn Storage,
    config: &CrawlerConfig,
    now: DateTime<Utc>,
) -> StorageResult<usize> {
    let eligible = storage.eligible_failed_items(now - config.retry_backoff())?;
    for item in &eligible {
        storage.transition_queue_item(item.id, QueueStatus::Pending, now)?;
        tracing::debug!("Reset failed item {} ({}) to pending", item.id, item.url);
    }
    Ok(eligible.len())
}

/// Re-enqueues every unprocessed document at [`BACKFILL_DEPTH`]
///
/// Documents that already have a queue row are rejected by the normal
/// enqueue rules, so after one full pass this usually adds nothing.
///
/// # Returns
///
/// Number of items actually added
pub fn backfill_unprocessed(
    storage: &mut dyn Storage,
    config: &CrawlerConfig,
    now: DateTime<Utc>,
) -> StorageResult<usize> {
    let mut added = 0;
    for document in storage.unprocessed_documents()? {
        if !is_valid_url(&document.url) {
            tracing::warn!("Unprocessed document has invalid URL: {}", document.url);
            continue;
        }
        if add_to_queue(storage, config, &document.url, None, BACKFILL_DEPTH, now)? {
            added += 1;
        }
    }
    Ok(added)
}

/// Marks items left in `processing` by a previous process as failed
///
/// They come back through the regular retry sweep once the backoff elapses.
pub fn recover_interrupted(storage: &mut dyn Storage, now: DateTime<Utc>) -> StorageResult<usize> {
    let stranded = storage.queue_items_by_status(QueueStatus::Processing)?;
    for item in &stranded {
        storage.transition_queue_item(item.id, QueueStatus::Failed, now)?;
        tracing::warn!("Recovered interrupted item {} ({})", item.id, item.url);
    }
    Ok(stranded.len())
}
