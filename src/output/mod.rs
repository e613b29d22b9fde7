//! Output module for crawl reports
//!
//! This module reads the crawl database and prints a statistics report,
//! used both by `--stats` and at the end of a crawl.

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};
