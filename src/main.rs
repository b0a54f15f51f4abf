//! Visa-Harvest main entry point
//!
//! This is the command-line host for the Visa newsroom harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use visa_harvest::browser::ChromiumBrowser;
use visa_harvest::config::{load_config_with_hash, Config};
use visa_harvest::crawler::{harvest, RunSummary};
use visa_harvest::intake::{CollectingIntake, Intake, SqliteIntake};
use visa_harvest::{Restriction, SourceRef};

/// Visa-Harvest: press releases and consulting archive from usa.visa.com
///
/// Drives a Chromium session over the Visa newsroom, extracts every
/// press release and archive report newer than the configured bound and
/// stores them in a SQLite database.
#[derive(Parser, Debug)]
#[command(name = "visa-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Harvests the Visa newsroom into SQLite", long_about = None)]
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

    /// Crawl without storing anything and print what would be stored
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let result = if cli.stats {
        handle_stats(&config)
    } else if cli.dry_run {
        handle_dry_run(&config).await
    } else {
        handle_crawl(&config).await
    };

    Ok(result?)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("visa_harvest=info,warn"),
            1 => EnvFilter::new("visa_harvest=debug,info"),
            2 => EnvFilter::new("visa_harvest=trace,debug"),
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

/// Handles the --stats mode: shows what the database holds
fn handle_stats(config: &Config) -> visa_harvest::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let intake =
        SqliteIntake::open(Path::new(&config.output.database_path), &config.source.name)?;
    println!("Stored documents: {}", intake.count_documents()?);

    let recent = intake.recent_documents(10)?;
    if !recent.is_empty() {
        println!("\nMost recent:");
        for document in recent {
            println!(
                "  {}  {}\n              {}",
                document.published.format("%Y-%m-%d"),
                document.title,
                document.url
            );
        }
    }

    Ok(())
}

/// Handles the --dry-run mode: crawls into memory and prints titles
async fn handle_dry_run(config: &Config) -> visa_harvest::Result<()> {
    println!("=== Visa-Harvest Dry Run ===\n");

    let restriction = config.restriction()?;
    let mut collected = CollectingIntake::with_limit(restriction.max_materials);

    let result = run_with_browser(config, restriction, &mut collected).await;

    for document in collected.documents() {
        println!(
            "  {}  {}",
            document.published.format("%Y-%m-%d"),
            document.title
        );
    }
    println!("\nWould store {} documents", collected.documents().len());

    report(result)
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> visa_harvest::Result<()> {
    let mut intake =
        SqliteIntake::open(Path::new(&config.output.database_path), &config.source.name)?;

    let mut restriction = config.restriction()?;
    intake = intake.with_max_materials(restriction.max_materials);

    if config.restrictions.to_last_material {
        match intake.latest_document()? {
            Some(last) => {
                tracing::info!("Crawling up to last stored document: {}", last.url);
                restriction = restriction.with_last_seen(last);
            }
            None => tracing::info!("No stored documents, crawling the full listing"),
        }
    }

    let result = run_with_browser(config, restriction, &mut intake).await;
    tracing::info!("Documents stored this run: {}", intake.accepted());

    report(result)
}

/// Starts the browser, runs the harvest and always closes the browser
async fn run_with_browser<I: Intake>(
    config: &Config,
    restriction: Restriction,
    intake: I,
) -> visa_harvest::Result<RunSummary> {
    let mut browser = match &config.browser.remote_url {
        Some(url) => ChromiumBrowser::connect(url).await?,
        None => ChromiumBrowser::launch(config.browser.headless).await?,
    };

    let result = harvest(
        SourceRef::source(&config.source.name),
        restriction,
        config.site_layout(),
        &mut browser,
        intake,
    )
    .await;

    if let Err(e) = browser.close().await {
        tracing::warn!("Failed to close browser: {}", e);
    }

    Ok(result?)
}

/// An early finish is a normal end of run for the host
fn report(result: visa_harvest::Result<RunSummary>) -> visa_harvest::Result<()> {
    match result {
        Ok(summary) => {
            tracing::info!(
                "Harvest completed: {} submitted, {} skipped, {} failed",
                summary.submitted,
                summary.skipped,
                summary.failed
            );
            Ok(())
        }
        Err(e) if e.is_finish() => {
            tracing::info!("Harvest finished: {}", e);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e)
        }
    }
}
