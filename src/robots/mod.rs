//! Robots.txt policy checking
//!
//! This module fetches robots.txt once per origin, caches the rules for a
//! configurable period and answers allow/deny questions for the crawl loop.
//! A robots.txt that cannot be fetched, or answers with a non-2xx status,
//! is treated as allowing everything.

mod cache;
mod parser;

pub use cache::CachedRobots;
pub use parser::RobotsRules;

use crate::config::{FetchConfig, UserAgentConfig};
use crate::crawler::{build_http_client, Clock};
use crate::url::{is_file_url, parse_crawlable_url};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Decides whether the crawler may fetch a URL
#[async_trait]
pub trait PolicyChecker: Send + Sync {
    /// Returns false when `url` must not be fetched by `product_token`
    async fn is_allowed(&self, url: &str, product_token: &str) -> bool;
}

/// Builds the robots.txt location for a URL's origin
///
/// # Example
///
/// ```
/// use navigate_crawler::robots::robots_url_for;
///
/// assert_eq!(
///     robots_url_for("https://example.com:8443/a/b?q=1").as_deref(),
///     Some("https://example.com:8443/robots.txt")
/// );
/// ```
pub fn robots_url_for(url: &str) -> Option<String> {
    let parsed = parse_crawlable_url(url).ok()?;
    Some(format!("{}/robots.txt", parsed.origin().ascii_serialization()))
}

/// robots.txt-backed policy with a per-origin cache
pub struct RobotsPolicyChecker {
    client: Client,
    clock: Arc<dyn Clock>,
    cache_ttl: chrono::Duration,
    cache: Mutex<HashMap<String, CachedRobots>>,
}

impl RobotsPolicyChecker {
    pub fn new(
        user_agent: &UserAgentConfig,
        fetch: &FetchConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, fetch.robots_timeout())?,
            clock,
            cache_ttl: fetch.robots_cache_ttl(),
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CachedRobots>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of origins with cached rules
    pub fn cached_origins(&self) -> usize {
        self.entries().len()
    }

    async fn fetch_rules(&self, robots_url: &str) -> RobotsRules {
        let response = match self.client.get(robots_url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Could not fetch {}: {}", robots_url, e);
                return RobotsRules::allow_all();
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "{} answered {}, allowing all",
                robots_url,
                response.status()
            );
            return RobotsRules::allow_all();
        }

        match response.text().await {
            Ok(body) => RobotsRules::from_content(&body),
            Err(e) => {
                tracing::debug!("Could not read {}: {}", robots_url, e);
                RobotsRules::allow_all()
            }
        }
    }

    async fn rules_for(&self, robots_url: &str) -> RobotsRules {
        let now = self.clock.now();
        let fresh = self
            .entries()
            .get(robots_url)
            .filter(|cached| !cached.is_stale(now, self.cache_ttl))
            .map(|cached| cached.rules.clone());
        if let Some(rules) = fresh {
            return rules;
        }

        let rules = self.fetch_rules(robots_url).await;
        self.entries().insert(
            robots_url.to_string(),
            CachedRobots::new(rules.clone(), self.clock.now()),
        );
        rules
    }
}

#[async_trait]
impl PolicyChecker for RobotsPolicyChecker {
    async fn is_allowed(&self, url: &str, product_token: &str) -> bool {
        let Some(robots_url) = robots_url_for(url) else {
            tracing::warn!("Denying invalid URL: {}", url);
            return false;
        };

        if is_file_url(url) {
            tracing::debug!("Denying file URL: {}", url);
            return false;
        }

        self.rules_for(&robots_url)
            .await
            .is_allowed(url, product_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::ManualClock;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn checker() -> (Arc<ManualClock>, RobotsPolicyChecker) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        ));
        let checker = RobotsPolicyChecker::new(
            &UserAgentConfig::default(),
            &FetchConfig::default(),
            clock.clone(),
        )
        .unwrap();
        (clock, checker)
    }

    async fn serve_robots(server: &MockServer, body: &str, expected_fetches: u64) {
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(expected_fetches)
            .mount(server)
            .await;
    }

    #[test]
    fn test_robots_url_for() {
        assert_eq!(
            robots_url_for("http://example.com/a/b#frag").as_deref(),
            Some("http://example.com/robots.txt")
        );
        assert_eq!(robots_url_for("ftp://example.com/"), None);
        assert_eq!(robots_url_for("not a url"), None);
    }

    #[tokio::test]
    async fn test_disallow_rules_are_applied() {
        let server = MockServer::start().await;
        serve_robots(&server, "User-agent: NavigateBot\nDisallow: /private", 1).await;
        let (_clock, checker) = checker();

        assert!(
            checker
                .is_allowed(&format!("{}/public", server.uri()), "NavigateBot")
                .await
        );
        assert!(
            !checker
                .is_allowed(&format!("{}/private/page", server.uri()), "NavigateBot")
                .await
        );
        assert!(
            checker
                .is_allowed(&format!("{}/private/page", server.uri()), "OtherBot")
                .await
        );
        assert_eq!(checker.cached_origins(), 1);
    }

    #[tokio::test]
    async fn test_missing_robots_allows_all() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/robots.txt"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        let (_clock, checker) = checker();

        let url = format!("{}/anything", server.uri());
        assert!(checker.is_allowed(&url, "NavigateBot").await);
        assert!(checker.is_allowed(&url, "NavigateBot").await);
    }

    #[tokio::test]
    async fn test_unreachable_host_allows() {
        let (_clock, checker) = checker();
        assert!(checker.is_allowed("http://127.0.0.1:9/page", "NavigateBot").await);
    }

    #[tokio::test]
    async fn test_cache_expires_after_ttl() {
        let server = MockServer::start().await;
        serve_robots(&server, "User-agent: *\nAllow: /", 2).await;
        let (clock, checker) = checker();
        let url = format!("{}/page", server.uri());

        assert!(checker.is_allowed(&url, "NavigateBot").await);
        clock.advance(Duration::from_secs(23 * 3600));
        assert!(checker.is_allowed(&url, "NavigateBot").await);
        clock.advance(Duration::from_secs(2 * 3600));
        assert!(checker.is_allowed(&url, "NavigateBot").await);
    }

    #[tokio::test]
    async fn test_invalid_and_file_urls_are_denied() {
        let (_clock, checker) = checker();
        assert!(!checker.is_allowed("not a url", "NavigateBot").await);
        assert!(!checker.is_allowed("mailto:a@example.com", "NavigateBot").await);
        assert!(
            !checker
                .is_allowed("http://127.0.0.1:9/report.pdf", "NavigateBot")
                .await
        );
        assert_eq!(checker.cached_origins(), 0);
    }
}
