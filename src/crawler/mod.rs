//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a body size cap
//! - HTML content extraction and link discovery
//! - Queue policy and per-host politeness
//! - Document persistence and the link graph
//! - Overall crawl coordination

mod clock;
mod coordinator;
mod fetcher;
mod links;
mod parser;
mod persist;
mod queue;
mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{Coordinator, CrawlCounters, CrawlStep, ItemOutcome};
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use links::{save_link_relations, LinkSaveOutcome};
pub use parser::{truncate_chars, ContentExtractor, ExtractError, ExtractedPage, HtmlExtractor};
pub use persist::{document_fields, resolve_link_target, save_scrape_result, split_keywords};
pub use queue::{
    add_to_queue, backfill_unprocessed, next_from_queue, recover_interrupted,
    reset_eligible_failed, BACKFILL_DEPTH,
};
pub use scheduler::PolitenessScheduler;

use crate::config::Config;
use crate::storage::open_storage;
use crate::CrawlError;
use std::path::Path;

/// Runs a complete crawl
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the storage database
/// 2. Build the fetcher, extractor and robots.txt policy
/// 3. Enqueue the seeds at depth 0
/// 4. Run the crawl loop until no work is left
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seeds` - Seed URLs
///
/// # Returns
///
/// * `Ok(CrawlCounters)` - Totals for the finished crawl
/// * `Err(CrawlError)` - Startup failed
pub async fn run_crawl(config: Config, seeds: &[String]) -> Result<CrawlCounters, CrawlError> {
    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let mut coordinator = Coordinator::new(config, storage)?;
    coordinator.seed(seeds)?;
    coordinator.run().await
}
