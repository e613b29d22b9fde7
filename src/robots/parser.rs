//! Robots.txt rule evaluation
//!
//! Matching is delegated to the robotstxt crate; this type only remembers the
//! body and whether it should be bypassed entirely.

use robotstxt::DefaultMatcher;

/// Rules from one robots.txt body
#[derive(Debug, Clone)]
pub struct RobotsRules {
    content: String,
    allow_all: bool,
}

impl RobotsRules {
    /// Wraps a fetched robots.txt body
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Rules that permit every URL
    ///
    /// Used when robots.txt is missing or could not be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Returns true if this is the permissive fallback
    pub fn is_allow_all(&self) -> bool {
        self.allow_all
    }

    /// Checks whether `url` may be fetched by `product_token`
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL or path to check
    /// * `product_token` - Crawler name matched against `User-agent` lines
    pub fn is_allowed(&self, url: &str, product_token: &str) -> bool {
        if self.allow_all || self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, product_token, url)
    }
}
