//! dealer-inventory main entry point
//!
//! This is the command-line interface for the dealer inventory tracker.

use anyhow::Context;
use clap::Parser;
use dealer_inventory::config::{load_config_with_hash, Config};
use dealer_inventory::crawler::crawl;
use dealer_inventory::report::{format_duration, generate_markdown_report};
use dealer_inventory::storage::open_store;
use dealer_inventory::{Brand, InventoryStore};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// dealer-inventory: tracks certified pre-owned dealer inventory
///
/// Crawls each brand's inventory service across the configured location
/// codes, records every vehicle in SQLite, and reports price changes since
/// the previous crawl.
#[derive(Parser, Debug)]
#[command(name = "dealer-inventory")]
#[command(version)]
#[command(about = "Tracks dealer inventory and price changes", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Brands to crawl (defaults to every configured brand)
    #[arg(long, num_args = 1.., value_name = "BRAND")]
    brands: Vec<Brand>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show stored inventory counts and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let brands = if cli.brands.is_empty() {
        config.brands.iter().map(|b| b.name).collect()
    } else {
        cli.brands.clone()
    };

    if cli.dry_run {
        handle_dry_run(&config, &brands);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, &brands).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dealer_inventory=info,warn"),
            1 => EnvFilter::new("dealer_inventory=debug,info"),
            2 => EnvFilter::new("dealer_inventory=trace,debug"),
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

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, brands: &[Brand]) {
    println!("=== dealer-inventory Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Page delay: {}ms", config.crawler.page_delay_ms);
    println!("  Location delay: {}ms", config.crawler.location_delay_ms);
    match config.crawler.fetch_timeout() {
        Some(timeout) => println!("  Fetch timeout: {}s", timeout.as_secs()),
        None => println!("  Fetch timeout: none"),
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Report: {}", config.output.report_path);
    if !config.report.recipients.is_empty() {
        println!("  Recipients: {}", config.report.recipients.join(", "));
    }

    println!("\nBrands ({}):", brands.len());
    for brand in brands {
        match config.brand(*brand) {
            Some(b) => println!(
                "  - {} (radius {} mi, endpoint {})",
                brand,
                b.radius,
                b.endpoint.as_deref().unwrap_or("default")
            ),
            None => println!("  - {} (not configured)", brand),
        }
    }

    let codes = config.location_codes();
    println!("\nLocation Codes ({}):", codes.len());
    for (region, region_codes) in &config.locations {
        println!("  - {}: {}", region, region_codes.join(", "));
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} brand(s) across {} location code(s)",
        brands.len(),
        codes.len()
    );
}

/// Handles the --stats mode: shows stored row counts per brand
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_store(Path::new(&config.output.database_path))?;
    let counts = store.count_by_brand()?;

    println!("Stored Inventory:");
    let mut total = 0;
    for brand in Brand::ALL {
        let count = counts.get(&brand).copied().unwrap_or(0);
        total += count;
        println!("  {:<10} {}", brand.to_string(), count);
    }
    println!("  {:<10} {}", "Total", total);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, brands: &[Brand]) -> anyhow::Result<()> {
    let start = Instant::now();
    let report_path = PathBuf::from(&config.output.report_path);
    let recipients = config.report.recipients.clone();

    tracing::info!(
        "Starting crawl for {}",
        brands
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let reports = match crawl(config, brands).await {
        Ok(reports) => reports,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    for report in &reports {
        println!("{}", report.summary());
    }

    let elapsed = start.elapsed();
    generate_markdown_report(&reports, elapsed, &recipients, &report_path)
        .with_context(|| format!("Failed to write report {}", report_path.display()))?;

    let total: usize = reports.iter().map(|r| r.total_vehicles).sum();
    println!("✓ Report written to: {}", report_path.display());
    println!(
        "✓ {} vehicles across {} brand(s) in {}",
        total,
        reports.len(),
        format_duration(elapsed)
    );

    Ok(())
}
