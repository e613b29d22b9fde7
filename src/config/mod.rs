//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! file and reading the seed list.
//!
//! # Example
//!
//! ```no_run
//! use navigate_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod seeds;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, ExtractConfig, FetchConfig, SeedsConfig, StorageConfig,
    UserAgentConfig, MAX_WINDOW_HOURS,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_or_default, load_config_with_hash, parse_config,
};
pub use seeds::{load_seeds, parse_seeds};
pub use validation::validate;
