//! Pricewalk main entry point
//!
//! This is the command-line interface for the Pricewalk catalog crawler.

use clap::Parser;
use pricewalk::config::load_config_with_hash;
use pricewalk::crawler::crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Pricewalk: a grocery catalog price crawler
///
/// Pricewalk walks every leaf category of a retail grocery catalog through a
/// browser-automation session and appends structured price records to a
/// local SQLite dataset. Interrupted runs resume where they left off.
#[derive(Parser, Debug)]
#[command(name = "pricewalk")]
#[command(version = "1.0.0")]
#[command(about = "A grocery catalog price crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Resume from the persisted visited-set (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start a fresh crawl, clearing the persisted visited-set
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the dataset and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, &config_hash, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pricewalk=info,warn"),
            1 => EnvFilter::new("pricewalk=debug,info"),
            2 => EnvFilter::new("pricewalk=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &pricewalk::config::Config) -> Result<(), Box<dyn std::error::Error>> {
    use pricewalk::catalog::read_snapshot;
    use std::path::Path;

    println!("=== Pricewalk Dry Run ===\n");

    println!("Site:");
    println!("  Home URL: {}", config.site.home_url);

    println!("\nBrowser:");
    println!("  WebDriver URL: {}", config.browser.webdriver_url);
    println!("  Page settle: {}ms", config.browser.page_settle_ms);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Snapshot: {}", config.output.snapshot_path);

    let snapshot_path = Path::new(&config.output.snapshot_path);
    if snapshot_path.exists() {
        match read_snapshot(snapshot_path) {
            Ok(tree) => {
                println!("\nCategory tree snapshot ({} leaves):", tree.leaf_count());
                tree.for_each_leaf(&mut |name, url| {
                    println!("  - {} ({})", name, url);
                });
            }
            Err(e) => {
                println!("\nSnapshot exists but could not be read: {}", e);
            }
        }
    } else {
        println!("\nNo category tree snapshot; the first run will discover one.");
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the dataset
fn handle_stats(config: &pricewalk::config::Config) -> Result<(), Box<dyn std::error::Error>> {
    use pricewalk::output::{load_statistics, print_statistics};
    use pricewalk::storage::SqliteStore;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: pricewalk::config::Config,
    config_hash: &str,
    fresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use pricewalk::output::print_run_summary;

    if fresh {
        tracing::info!("Starting fresh crawl (clearing the persisted visited-set)");
    } else {
        tracing::info!("Starting crawl (resuming from the persisted visited-set)");
    }

    match crawl(config, config_hash, fresh).await {
        Ok(summary) => {
            print_run_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
