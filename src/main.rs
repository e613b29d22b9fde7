//! Navigate crawler main entry point
//!
//! This is the command-line interface for the navigate crawler.

use anyhow::Context;
use clap::Parser;
use navigate_crawler::config::{load_config_or_default, load_seeds, Config};
use navigate_crawler::crawler::run_crawl;
use navigate_crawler::output::{load_statistics, print_statistics};
use navigate_crawler::storage::open_storage;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Navigate: a polite, depth-bounded web crawler
///
/// Crawls outward from a seed list, respecting robots.txt and per-host
/// cooldowns, and stores documents and their link graph in SQLite.
#[derive(Parser, Debug)]
#[command(name = "navigate-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite, depth-bounded web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed list, one URL per line (overrides the config)
    #[arg(long, value_name = "PATH")]
    seeds: Option<PathBuf>,

    /// SQLite database path, `sqlite://` prefix accepted (overrides the config)
    #[arg(long, value_name = "PATH", env = "DATABASE_URL")]
    database: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show statistics from the database and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, hash) = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    match hash {
        Some(hash) => tracing::info!("Configuration loaded (hash: {})", hash),
        None => tracing::info!("No configuration file given, using defaults"),
    }

    apply_overrides(&mut config, &cli);

    if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("navigate_crawler=info,warn"),
            1 => EnvFilter::new("navigate_crawler=debug,info"),
            2 => EnvFilter::new("navigate_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(database) = &cli.database {
        let path = database.strip_prefix("sqlite://").unwrap_or(database);
        config.storage.database_path = path.to_string();
    }
    if let Some(seeds) = &cli.seeds {
        config.seeds.path = seeds.display().to_string();
    }
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.storage.database_path);
    print_database_statistics(&config.storage.database_path)
}

fn print_database_statistics(database_path: &str) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(database_path))
        .with_context(|| format!("Failed to open database {}", database_path))?;
    let stats = load_statistics(&storage).context("Failed to load statistics")?;
    print_statistics(&stats);
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    let seeds = load_seeds(Path::new(&config.seeds.path))
        .with_context(|| format!("Failed to read seed file {}", config.seeds.path))?;
    tracing::info!("Loaded {} seed URLs from {}", seeds.len(), config.seeds.path);

    tracing::info!(
        "Max depth: {}, host cooldown: {}s, agent: {}",
        config.crawler.max_depth,
        config.crawler.host_cooldown_secs,
        config.user_agent.user_agent_string()
    );

    let database_path = config.storage.database_path.clone();
    let counters = run_crawl(config, &seeds)
        .await
        .context("Crawl could not start")?;

    tracing::info!(
        "Crawl finished: {} processed, {} completed, {} failed, {} disallowed, {} edges saved ({} failed)",
        counters.processed,
        counters.completed,
        counters.failed,
        counters.disallowed,
        counters.links_created,
        counters.links_failed
    );

    print_database_statistics(&database_path)
}
