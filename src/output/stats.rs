//! Statistics generation from crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::state::QueueStatus;
use crate::storage::{Storage, StorageResult};
use std::collections::HashMap;

/// How many failed or disallowed URLs a report lists
const MAX_LISTED_URLS: usize = 20;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Total number of queue rows
    pub total_queue_items: u64,

    /// Count of queue items by status
    pub queue_by_status: HashMap<QueueStatus, u64>,

    pub total_documents: u64,
    pub processed_documents: u64,
    pub unprocessed_documents: u64,

    /// Total number of link relations
    pub total_links: u64,

    /// Sample of URLs currently failed
    pub failed_urls: Vec<String>,

    /// Sample of URLs refused by robots.txt
    pub disallowed_urls: Vec<String>,
}

impl CrawlStatistics {
    pub fn queue_count(&self, status: QueueStatus) -> u64 {
        self.queue_by_status.get(&status).copied().unwrap_or(0)
    }
}

fn sample_urls(storage: &dyn Storage, status: QueueStatus) -> StorageResult<Vec<String>> {
    Ok(storage
        .queue_items_by_status(status)?
        .into_iter()
        .take(MAX_LISTED_URLS)
        .map(|item| item.url)
        .collect())
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<CrawlStatistics> {
    let queue_by_status = storage.count_queue_by_status()?;
    let processed_documents = storage.count_documents(Some(true))?;
    let unprocessed_documents = storage.count_documents(Some(false))?;

    Ok(CrawlStatistics {
        total_queue_items: queue_by_status.values().sum(),
        queue_by_status,
        total_documents: processed_documents + unprocessed_documents,
        processed_documents,
        unprocessed_documents,
        total_links: storage.count_links()?,
        failed_urls: sample_urls(storage, QueueStatus::Failed)?,
        disallowed_urls: sample_urls(storage, QueueStatus::Disallowed)?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Queue ({} items):", stats.total_queue_items);
    for status in QueueStatus::all_states() {
        let count = stats.queue_count(status);
        let percentage = if stats.total_queue_items > 0 {
            (count as f64 / stats.total_queue_items as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    println!("Documents:");
    println!("  Total: {}", stats.total_documents);
    println!("  Processed: {}", stats.processed_documents);
    println!("  Unprocessed: {}", stats.unprocessed_documents);
    println!();

    println!("Link relations: {}", stats.total_links);
    println!();

    if !stats.failed_urls.is_empty() {
        println!(
            "Failed URLs ({} of {}):",
            stats.failed_urls.len(),
            stats.queue_count(QueueStatus::Failed)
        );
        for url in &stats.failed_urls {
            println!("  - {}", url);
        }
        println!();
    }

    if !stats.disallowed_urls.is_empty() {
        println!(
            "Disallowed URLs ({} of {}):",
            stats.disallowed_urls.len(),
            stats.queue_count(QueueStatus::Disallowed)
        );
        for url in &stats.disallowed_urls {
            println!("  - {}", url);
        }
        println!();
    }
}
