//! Per-origin robots.txt cache entries

use crate::robots::RobotsRules;
use chrono::{DateTime, Duration, Utc};

/// Robots rules for one origin plus the time they were fetched
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub rules: RobotsRules,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    pub fn new(rules: RobotsRules, fetched_at: DateTime<Utc>) -> Self {
        Self { rules, fetched_at }
    }

    /// How long ago the rules were fetched, as seen at `now`
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// Returns true once the entry is older than `max_age`
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age(now) > max_age
    }

    pub fn is_allowed(&self, url: &str, product_token: &str) -> bool {
        self.rules.is_allowed(url, product_token)
    }
}
