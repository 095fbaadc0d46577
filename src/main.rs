//! Spider-Pool main entry point
//!
//! This is the command-line interface for the Spider-Pool crawler.

use clap::Parser;
use spider_pool::config::{load_config, validate, CancelPolicy, Config};
use spider_pool::crawler::run_crawl;
use spider_pool::output::{print_report, print_urls};
use spider_pool::CrawlError;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Spider-Pool: a bounded-concurrency web crawler
///
/// Crawls outward from a seed URL with a fixed number of workers, fetching
/// every reachable page at most once up to the configured depth.
#[derive(Parser, Debug)]
#[command(name = "spider-pool")]
#[command(version)]
#[command(about = "A bounded-concurrency web crawler", long_about = None)]
struct Cli {
    /// URL to start crawling from (overrides the config file)
    #[arg(value_name = "SEED_URL", required_unless_present = "config")]
    seed: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<u32>,

    /// Maximum crawl depth (pages at this depth are not fetched)
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Per-request fetch timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Stop the crawl after this many seconds
    #[arg(long, value_name = "SECS")]
    deadline: Option<u64>,

    /// User-Agent header sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Do not follow HTTP redirects
    #[arg(long)]
    no_redirects: bool,

    /// Abort in-flight fetches on cancellation instead of letting them finish
    #[arg(long)]
    abort_in_flight: bool,

    /// Print every visited URL after the report
    #[arg(long)]
    list_urls: bool,

    /// Validate config and show the effective settings without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.list_urls).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("spider_pool=info,warn"),
            1 => EnvFilter::new("spider_pool=debug,info"),
            2 => EnvFilter::new("spider_pool=trace,debug"),
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

/// Loads the config file if given, then applies command-line overrides
fn build_config(cli: &Cli) -> Result<Config, spider_pool::ConfigError> {
    let mut config = match (&cli.config, &cli.seed) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        (None, Some(seed)) => Config::for_seed(seed.clone()),
        (None, None) => {
            return Err(spider_pool::ConfigError::Validation(
                "either a seed URL or --config is required".to_string(),
            ))
        }
    };

    if let Some(seed) = &cli.seed {
        config.crawler.seed_url = seed.clone();
    }
    if let Some(workers) = cli.workers {
        config.crawler.worker_count = workers;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(deadline) = cli.deadline {
        config.crawler.deadline_secs = Some(deadline);
    }
    if cli.abort_in_flight {
        config.crawler.cancel_policy = CancelPolicy::Abort;
    }
    if let Some(timeout) = cli.timeout {
        config.fetcher.timeout_secs = timeout;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.fetcher.user_agent = user_agent.clone();
    }
    if cli.no_redirects {
        config.fetcher.follow_redirects = false;
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Spider-Pool Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.seed_url);
    println!("  Workers: {}", config.crawler.worker_count);
    println!("  Max depth: {}", config.crawler.max_depth);
    match config.crawler.deadline_secs {
        Some(secs) => println!("  Deadline: {}s", secs),
        None => println!("  Deadline: none"),
    }
    println!("  Cancel policy: {:?}", config.crawler.cancel_policy);

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Connect timeout: {}s", config.fetcher.connect_timeout_secs);
    println!(
        "  Redirects: {}",
        if config.fetcher.follow_redirects {
            format!("follow (max {})", config.fetcher.max_redirects)
        } else {
            "not followed".to_string()
        }
    );

    println!("\nFilter:");
    println!(
        "  Excluded extensions: {}",
        config.filter.excluded_extensions.join(", ")
    );
    println!(
        "  Excluded patterns ({}):",
        config.filter.excluded_patterns.len()
    );
    for pattern in &config.filter.excluded_patterns {
        println!("    - {}", pattern);
    }
    println!(
        "  Excluded domains ({}):",
        config.filter.excluded_domains.len()
    );
    for domain in &config.filter.excluded_domains {
        println!("    - {}", domain);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, list_urls: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping crawl");
                cancel.cancel();
            }
        });
    }

    match run_crawl(config, Some(cancel)).await {
        Ok((stats, urls)) => {
            print_report(&stats, false);
            if list_urls {
                print_urls(&urls);
            }
            Ok(())
        }
        Err(CrawlError::Cancelled { stats, visited }) => {
            print_report(&stats, true);
            if list_urls {
                print_urls(&visited);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
