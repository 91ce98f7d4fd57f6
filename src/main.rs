use analytics::MarketSnapshot;
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use configuration::{Config, DataSource};
use core_types::{Instrument, PriceTable};
use event_processor::EventWindowProcessor;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use market_data::{CsvPriceStore, PriceProvider, YahooClient};
use std::path::{Path, PathBuf};
use tracing::Instrument as _;
use uuid::Uuid;

mod export;
mod report;

/// The main entry point for the stressvar application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A .env file is optional; it may carry STRESSVAR__* overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = configuration::load_config(cli.command.config_path())
        .with_context(|| format!("failed to load {}", cli.command.config_path().display()))?;
    let _log_guard = configuration::logging::init(&config.logging)?;
    config.warn_on_uncovered_windows();

    let run_id = Uuid::new_v4();

    // Execute the appropriate command
    let outcome = async {
        match cli.command {
            Commands::Backfill(args) => handle_backfill(args, &config).await,
            Commands::Run(args) => handle_run(args, &config, run_id).await,
        }
    }
    .instrument(tracing::info_span!("run", %run_id))
    .await;

    if let Err(e) = &outcome {
        tracing::error!("{e:#}");
    }
    outcome
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Rolling VaR/CVaR of price-weighted portfolios around market-stress events.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily closes for every configured ticker into a CSV snapshot.
    Backfill(BackfillArgs),
    /// Run the event-window study and print the CVaR and backtest reports.
    Run(RunArgs),
}

impl Commands {
    fn config_path(&self) -> &Path {
        match self {
            Commands::Backfill(args) => &args.config,
            Commands::Run(args) => &args.config,
        }
    }
}

#[derive(Parser)]
struct BackfillArgs {
    /// Path to the study configuration.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// The start date for data download (format: YYYY-MM-DD). Defaults to `data.start`.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// The end date for data download (format: YYYY-MM-DD). Defaults to `data.end`.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Where to write the snapshot. Defaults to `data.prices_path`.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser)]
struct RunArgs {
    /// Path to the study configuration.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides `data.source`.
    #[arg(long, value_enum)]
    source: Option<DataSource>,

    /// Overrides `data.prices_path` for the csv source.
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Directory for the CSV and JSON exports. Nothing is written when omitted.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

// ==============================================================================
// Backfill Command Logic
// ==============================================================================

/// Downloads every ticker concurrently and saves the merged table as a snapshot.
async fn handle_backfill(args: BackfillArgs, config: &Config) -> anyhow::Result<()> {
    let from = args.from.unwrap_or(config.data.start);
    let to = args.to.unwrap_or(config.data.end);
    anyhow::ensure!(from <= to, "--from {from} is after --to {to}");
    let out = args.out.unwrap_or_else(|| config.data.prices_path.clone());
    let tickers = config.all_instruments()?;

    tracing::info!(tickers = tickers.len(), %from, %to, "Starting backfill.");

    let client = YahooClient::new(config.data.yahoo_base_url.clone())?;

    // Set up the progress bar
    let progress_bar = ProgressBar::new(tickers.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    // Create one concurrent task per ticker
    let tasks: Vec<_> = tickers
        .iter()
        .cloned()
        .map(|ticker| {
            let client = client.clone();
            let pb_clone = progress_bar.clone();

            tokio::spawn(async move {
                pb_clone.set_message(format!("Fetching {ticker}..."));
                let closes = client.fetch_closes(&ticker, from, to).await;
                pb_clone.inc(1);
                (ticker, closes)
            })
        })
        .collect();

    // Wait for all concurrent tasks to complete
    let results = join_all(tasks).await;
    progress_bar.finish_with_message("Backfill complete!");

    let mut table = PriceTable::new();
    let mut failed: Vec<Instrument> = Vec::new();
    for result in results {
        let (ticker, closes) = result.context("a download task panicked")?;
        match closes {
            Ok(closes) => {
                if closes.is_empty() {
                    tracing::warn!(%ticker, "No closes returned for the requested range.");
                }
                for (date, price) in closes {
                    table.insert(date, ticker.clone(), price)?;
                }
            }
            Err(e) => {
                tracing::error!(%ticker, error = %e, "Download failed.");
                failed.push(ticker);
            }
        }
    }

    // A partial snapshot would only fail later with an unknown ticker.
    if !failed.is_empty() {
        let names: Vec<_> = failed.iter().map(|t| t.as_str()).collect();
        anyhow::bail!(
            "{} of {} downloads failed ({}); snapshot not written",
            failed.len(),
            tickers.len(),
            names.join(", ")
        );
    }

    CsvPriceStore::new(&out)
        .save(&table)
        .with_context(|| format!("failed to write {}", out.display()))?;
    println!(
        "Saved {} dates for {} tickers to {}",
        table.len(),
        tickers.len(),
        out.display()
    );
    Ok(())
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

/// Builds the market snapshot, runs the study once and reports from its cache.
async fn handle_run(args: RunArgs, config: &Config, run_id: Uuid) -> anyhow::Result<()> {
    let source = args.source.unwrap_or(config.data.source);
    let tickers = config.all_instruments()?;

    let provider: Box<dyn PriceProvider> = match source {
        DataSource::Csv => {
            let path = args
                .prices
                .unwrap_or_else(|| config.data.prices_path.clone());
            tracing::info!(path = %path.display(), "Reading prices from snapshot.");
            Box::new(CsvPriceStore::new(path))
        }
        DataSource::Yahoo => {
            tracing::info!("Downloading prices from Yahoo Finance.");
            Box::new(YahooClient::new(config.data.yahoo_base_url.clone())?)
        }
    };

    let prices = provider
        .get_daily_closes(&tickers, config.data.start, config.data.end)
        .await
        .context("failed to load daily closes")?;
    let snapshot = MarketSnapshot::new(prices)?;

    let study = EventWindowProcessor::from_config(config)?.run(&snapshot)?;

    println!("Worst CVaR per event and portfolio");
    println!("{}", report::cvar_summary_table(&study.cvar_summary()));
    println!();
    println!("VaR backtest");
    println!("{}", report::backtest_table(&study));
    if let Some(failures) = report::failures_table(&study) {
        println!();
        println!("Failed cells");
        println!("{failures}");
    }

    if let Some(dir) = args.out_dir {
        let written = export::write_all(&study, &dir, run_id)?;
        for path in written {
            tracing::info!(path = %path.display(), "Exported.");
        }
    }

    Ok(())
}
