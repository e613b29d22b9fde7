//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties everything together:
//! - Seeding the queue
//! - Dequeuing items under per-host cooldown
//! - Policy checks, fetching, extraction and document storage
//! - Link discovery, placeholder resolution and the link graph
//! - Backfill and retry sweeps when the queue runs dry
//!
//! All time comes from the injected [`Clock`], so a [`ManualClock`] makes the
//! whole loop run in virtual time.
//!
//! [`ManualClock`]: crate::crawler::ManualClock

use crate::config::Config;
use crate::crawler::clock::{Clock, SystemClock};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::links::save_link_relations;
use crate::crawler::parser::{ContentExtractor, ExtractedPage, HtmlExtractor};
use crate::crawler::persist::{resolve_link_target, save_scrape_result};
use crate::crawler::queue::{
    add_to_queue, backfill_unprocessed, next_from_queue, recover_interrupted,
    reset_eligible_failed,
};
use crate::crawler::scheduler::PolitenessScheduler;
use crate::robots::{PolicyChecker, RobotsPolicyChecker};
use crate::state::QueueStatus;
use crate::storage::{QueueItem, SqliteStorage, Storage};
use crate::url::{is_image_url, is_valid_url, normalize_url};
use crate::CrawlError;
use std::sync::Arc;

/// How a single claimed item ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Completed,
    Disallowed,
    Failed,
}

/// Result of one iteration of the crawl loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStep {
    /// A queue item was claimed and handled
    Processed { id: i64, outcome: ItemOutcome },
    /// The queue was empty and unprocessed documents were re-enqueued
    Backfilled(usize),
    /// The queue was empty and failed items were reset to pending
    RetriesReset(usize),
    /// Work remains but none of it is available yet
    Waiting,
    /// No pending, failed or backfillable work is left
    Finished,
}

/// Running totals for one crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlCounters {
    /// Items claimed and handled, whatever the outcome
    pub processed: u64,
    pub completed: u64,
    pub failed: u64,
    pub disallowed: u64,
    /// Discovered links that were not enqueued
    pub skipped: u64,
    /// Link graph edges written
    pub links_created: u64,
    /// Link graph edges that could not be written
    pub links_failed: u64,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    storage: SqliteStorage,
    scheduler: PolitenessScheduler,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ContentExtractor>,
    policy: Arc<dyn PolicyChecker>,
    clock: Arc<dyn Clock>,
    counters: CrawlCounters,
}

impl Coordinator {
    /// Creates a coordinator with the HTTP fetcher, HTML extractor and
    /// robots.txt policy built from `config`
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `storage` - An opened storage backend
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - An HTTP client could not be built
    pub fn new(config: Config, storage: SqliteStorage) -> Result<Self, CrawlError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let fetcher = HttpFetcher::new(&config.user_agent, &config.fetch)?;
        let policy = RobotsPolicyChecker::new(&config.user_agent, &config.fetch, clock.clone())?;
        let extractor = HtmlExtractor::new(&config.extract);

        Ok(Self {
            scheduler: PolitenessScheduler::new(clock.clone()),
            config: Arc::new(config),
            storage,
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
            policy: Arc::new(policy),
            clock,
            counters: CrawlCounters::default(),
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn PolicyChecker>) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the clock, resetting the cooldown map
    ///
    /// The default robots checker keeps its own clock; pass a policy built
    /// on the same clock with [`Coordinator::with_policy`] if that matters.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.scheduler = PolitenessScheduler::new(clock.clone());
        self.clock = clock;
        self
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn counters(&self) -> CrawlCounters {
        self.counters
    }

    /// Enqueues seed URLs at depth 0
    ///
    /// # Returns
    ///
    /// Number of seeds actually added
    pub fn seed(&mut self, seeds: &[String]) -> Result<usize, CrawlError> {
        let now = self.clock.now();
        let mut added = 0;

        for seed in seeds {
            if !is_valid_url(seed) {
                tracing::warn!("Skipping invalid seed: {}", seed);
                continue;
            }
            if add_to_queue(&mut self.storage, &self.config.crawler, seed, None, 0, now)? {
                added += 1;
            }
        }

        tracing::info!("Seeded {} of {} URLs", added, seeds.len());
        Ok(added)
    }

    /// Runs the crawl loop until no work is left
    ///
    /// Items left in `processing` by an earlier run are marked failed first.
    /// Errors inside one iteration are logged and the loop carries on after
    /// an idle wait.
    pub async fn run(&mut self) -> Result<CrawlCounters, CrawlError> {
        let recovered = recover_interrupted(&mut self.storage, self.clock.now())?;
        if recovered > 0 {
            tracing::info!("Marked {} interrupted items as failed", recovered);
        }

        let started = self.clock.now();
        tracing::info!("Starting crawl loop");

        loop {
            match self.step().await {
                Ok(CrawlStep::Processed { .. }) => {
                    if self.counters.processed % 10 == 0 {
                        self.log_progress(started);
                    }
                }
                Ok(CrawlStep::Backfilled(n)) => {
                    tracing::info!("Backfilled {} unprocessed documents", n);
                }
                Ok(CrawlStep::RetriesReset(n)) => {
                    tracing::info!("Reset {} failed items for retry", n);
                }
                Ok(CrawlStep::Waiting) => {
                    tracing::debug!(
                        "No item available, sleeping {:?}",
                        self.config.crawler.idle_poll()
                    );
                    self.clock.sleep(self.config.crawler.idle_poll()).await;
                }
                Ok(CrawlStep::Finished) => {
                    tracing::info!("No work left, crawl complete");
                    break;
                }
                Err(e) => {
                    tracing::error!("Crawl loop error: {}", e);
                    self.clock.sleep(self.config.crawler.idle_poll()).await;
                }
            }
        }

        self.log_progress(started);
        Ok(self.counters)
    }

    /// Performs one iteration of the crawl loop
    pub async fn step(&mut self) -> Result<CrawlStep, CrawlError> {
        let now = self.clock.now();
        let cooldown = self.config.crawler.host_cooldown();

        if let Some(item) = next_from_queue(&mut self.storage, &self.scheduler, cooldown, now)? {
            let outcome = self.process_item(&item).await;
            self.counters.processed += 1;
            return Ok(CrawlStep::Processed {
                id: item.id,
                outcome,
            });
        }

        let backfilled = backfill_unprocessed(&mut self.storage, &self.config.crawler, now)?;
        if backfilled > 0 {
            return Ok(CrawlStep::Backfilled(backfilled));
        }

        let reset = reset_eligible_failed(&mut self.storage, &self.config.crawler, now)?;
        if reset > 0 {
            return Ok(CrawlStep::RetriesReset(reset));
        }

        let counts = self.storage.count_queue_by_status()?;
        let outstanding = [QueueStatus::Pending, QueueStatus::Failed]
            .iter()
            .map(|status| counts.get(status).copied().unwrap_or(0))
            .sum::<u64>();

        if outstanding > 0 {
            Ok(CrawlStep::Waiting)
        } else {
            Ok(CrawlStep::Finished)
        }
    }

    /// Handles one claimed item; never propagates errors
    async fn process_item(&mut self, item: &QueueItem) -> ItemOutcome {
        tracing::info!("Crawling {} (depth {})", item.url, item.depth);

        let product_token = self.config.user_agent.product_token().to_string();
        if !self.policy.is_allowed(&item.url, &product_token).await {
            tracing::info!("URL {} disallowed by policy", item.url);
            self.counters.disallowed += 1;
            self.set_status(item, QueueStatus::Disallowed);
            return ItemOutcome::Disallowed;
        }

        match self.crawl_item(item).await {
            Ok(()) => {
                self.counters.completed += 1;
                self.clock.sleep(self.config.crawler.item_delay()).await;
                ItemOutcome::Completed
            }
            Err(e) => {
                tracing::warn!("Failed to crawl {}: {}", item.url, e);
                self.counters.failed += 1;
                self.set_status(item, QueueStatus::Failed);
                ItemOutcome::Failed
            }
        }
    }

    async fn crawl_item(&mut self, item: &QueueItem) -> Result<(), CrawlError> {
        self.scheduler.record_visit(&item.url);

        let fetched = self.fetcher.fetch(&item.url).await?;
        let page = self.extractor.extract(&fetched.body, &fetched.final_url)?;

        let now = self.clock.now();
        let saved = save_scrape_result(
            &mut self.storage,
            &self.config.storage,
            &item.url,
            &page,
            now,
        )?;

        match saved {
            Some(document_id) => {
                if item.depth < self.config.crawler.max_depth && !page.links.is_empty() {
                    self.follow_links(item, document_id, &page)?;
                }
                self.storage
                    .mark_document_processed(document_id, self.clock.now())?;
            }
            None => tracing::debug!("Nothing stored for {}", item.url),
        }

        self.storage
            .transition_queue_item(item.id, QueueStatus::Completed, self.clock.now())?;
        Ok(())
    }

    /// Enqueues outbound links one level deeper and records graph edges
    fn follow_links(
        &mut self,
        item: &QueueItem,
        document_id: i64,
        page: &ExtractedPage,
    ) -> Result<(), CrawlError> {
        let now = self.clock.now();
        let mut targets = Vec::with_capacity(page.links.len());

        for link in &page.links {
            if is_image_url(link) {
                self.counters.skipped += 1;
                continue;
            }
            if !is_valid_url(link) {
                tracing::warn!("Skipping invalid link {} on {}", link, item.url);
                self.counters.skipped += 1;
                continue;
            }

            let normalized = normalize_url(link);
            let added = add_to_queue(
                &mut self.storage,
                &self.config.crawler,
                &normalized,
                Some(&item.url),
                item.depth + 1,
                now,
            )?;
            if !added {
                self.counters.skipped += 1;
            }

            match resolve_link_target(&mut self.storage, &normalized, now) {
                Ok(target_id) => targets.push(target_id),
                Err(e) => tracing::warn!("Could not resolve link target {}: {}", normalized, e),
            }
        }

        let saved = save_link_relations(&mut self.storage, document_id, &targets, now);
        self.counters.links_created += saved.created as u64;
        self.counters.links_failed += saved.failed as u64;
        Ok(())
    }

    fn set_status(&mut self, item: &QueueItem, status: QueueStatus) {
        if let Err(e) = self
            .storage
            .transition_queue_item(item.id, status, self.clock.now())
        {
            tracing::error!("Could not mark item {} as {}: {}", item.id, status, e);
        }
    }

    fn log_progress(&self, started: chrono::DateTime<chrono::Utc>) {
        let elapsed = (self.clock.now() - started).num_milliseconds().max(1) as f64 / 1000.0;
        tracing::info!(
            "Progress: {} processed ({} completed, {} failed, {} disallowed), {} links skipped, {} edges saved ({} failed), {:.2} pages/sec",
            self.counters.processed,
            self.counters.completed,
            self.counters.failed,
            self.counters.disallowed,
            self.counters.skipped,
            self.counters.links_created,
            self.counters.links_failed,
            self.counters.processed as f64 / elapsed
        );
    }
}
