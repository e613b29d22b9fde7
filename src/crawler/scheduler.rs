//! Per-hostname politeness scheduling
//!
//! This module handles:
//! - Tracking the last visit to each hostname
//! - Deciding whether a hostname is still cooling down
//! - Reporting how long until a hostname is available again
//!
//! Cooldown is keyed by hostname, not URL, so different paths on one site
//! share a single budget. State lives only in memory and is lost on restart.

use crate::crawler::clock::Clock;
use crate::url::hostname_of;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Politeness scheduler owning the hostname → last-visit map
///
/// The map sits behind a mutex so that several workers could share one
/// scheduler; the sequential crawl loop never contends on it.
pub struct PolitenessScheduler {
    clock: Arc<dyn Clock>,
    last_visits: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl PolitenessScheduler {
    /// Creates a scheduler that reads time from `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_visits: Mutex::new(HashMap::new()),
        }
    }

    fn visits(&self) -> MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        self.last_visits.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns true if the URL's hostname was visited less than `cooldown` ago
    ///
    /// Invalid URLs are never in cooldown.
    pub fn is_in_cooldown(&self, url: &str, cooldown: Duration) -> bool {
        !self.time_until_available(url, cooldown).is_zero()
    }

    /// Stamps the current time for the URL's hostname
    pub fn record_visit(&self, url: &str) {
        match hostname_of(url) {
            Some(host) => {
                let now = self.clock.now();
                tracing::debug!("Recording visit to {} at {}", host, now);
                self.visits().insert(host, now);
            }
            None => tracing::warn!("Not recording visit for invalid URL: {}", url),
        }
    }

    /// Remaining wait before the URL's hostname may be visited, zero if available
    pub fn time_until_available(&self, url: &str, cooldown: Duration) -> Duration {
        let Some(host) = hostname_of(url) else {
            return Duration::ZERO;
        };

        let Some(last) = self.visits().get(&host).copied() else {
            return Duration::ZERO;
        };

        let cooldown = match chrono::Duration::from_std(cooldown) {
            Ok(c) => c,
            Err(_) => return Duration::ZERO,
        };

        let elapsed = self.clock.now() - last;
        (cooldown - elapsed).to_std().unwrap_or(Duration::ZERO)
    }

    /// Number of hostnames visited so far
    pub fn tracked_hosts(&self) -> usize {
        self.visits().len()
    }
}
