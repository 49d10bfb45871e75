//! Offer-Sweep main entry point
//!
//! This is the command-line interface for the Offer-Sweep listing harvester.

use anyhow::Context;
use clap::Parser;
use offer_sweep::config::{load_config_with_hash, Config};
use offer_sweep::crawler::sweep;
use offer_sweep::output::{merge_partials, print_field_counts, print_run_summary, RunSummary};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Offer-Sweep: a parallel vehicle-listing harvester
///
/// Offer-Sweep enumerates every make and model a classifieds search form
/// offers, scrapes all listings for each of them on a pool of isolated
/// workers, and merges the results into one de-duplicated dataset.
#[derive(Parser, Debug)]
#[command(name = "offer-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A parallel vehicle-listing harvester", long_about = None)]
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

    /// Validate config and show what would run without starting a browser
    #[arg(long, conflicts_with = "merge_only")]
    dry_run: bool,

    /// Merge partial outputs already on disk and exit
    #[arg(long, conflicts_with = "dry_run")]
    merge_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // Setup logging based on verbosity
    setup_logging(
        cli.verbose,
        cli.quiet,
        config.output.log_dir.as_deref().map(Path::new),
    )?;
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.merge_only {
        handle_merge_only(&config)?;
    } else {
        handle_sweep(config).await?;
    }

    Ok(())
}

/// Sets up console logging and, when `log_dir` is given, a dated log file
fn setup_logging(verbose: u8, quiet: bool, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("offer_sweep=info,warn"),
            1 => EnvFilter::new("offer_sweep=debug,info"),
            2 => EnvFilter::new("offer_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let path = dir.join(format!("{}.log", chrono::Local::now().format("%Y-%m-%d")));
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(())
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config) {
    println!("=== Offer-Sweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.worker_count);
    println!("  Max chunks per worker: {}", config.crawler.max_tasks_per_worker);
    println!("  Chunk multiplier: {}", config.crawler.chunk_multiplier);
    println!("  Attempts per combination: {}", config.crawler.combination_attempts);
    println!("  Max pages per combination: {}", config.crawler.max_pages_per_combination);
    if let Some(limit) = config.crawler.max_combinations {
        println!("  Max combinations: {}", limit);
    }

    println!("\nFetch:");
    println!("  Attempts: {}", config.fetch.attempts);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Backoff base: {}ms", config.fetch.backoff_base_ms);

    println!("\nSite:");
    println!("  Search page: {}", config.site.search_url);
    println!("  Offer link marker: {}", config.site.offer_link_marker);
    println!("  Headless: {}", config.site.headless);

    println!("\nOutput:");
    println!("  Partial files: {}", config.output.partial_dir);
    println!("  Dataset directory: {}", config.output.output_dir);
    println!(
        "  Dataset: {}",
        offer_sweep::output::dataset_path(&config.output, chrono::Local::now().date_naive())
            .display()
    );
    println!("  Ignored for duplicates: {}", config.output.dedup_ignore.join(", "));

    println!("\n✓ Configuration is valid");
}

/// Handles the --merge-only mode: merges partial outputs left on disk
fn handle_merge_only(config: &Config) -> anyhow::Result<()> {
    println!("=== Merging Partial Outputs ===\n");
    println!("Partial files: {}", config.output.partial_dir);

    let start_time = Instant::now();
    let report = merge_partials(&config.output, chrono::Local::now().date_naive())
        .context("Merge failed")?;

    println!(
        "✓ {} files merged, {} rows written to {} ({} duplicates removed)\n",
        report.files_merged,
        report.rows_written,
        report.output_path.display(),
        report.duplicates_removed
    );
    print_field_counts(&report.field_counts);

    let summary = RunSummary {
        records_written: report.rows_written,
        elapsed: start_time.elapsed(),
        ..RunSummary::default()
    };
    print_run_summary(&summary);

    Ok(())
}

/// Handles the full sweep
async fn handle_sweep(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting sweep with {} workers against {}",
        config.crawler.worker_count,
        config.site.search_url
    );

    match sweep(config).await {
        Ok(report) => {
            tracing::info!("Dataset written to {}", report.merge.output_path.display());
            print_field_counts(&report.merge.field_counts);
            print_run_summary(&report.summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Sweep failed: {}", e);
            Err(e.into())
        }
    }
}
