//! IbovLab CLI: resolve the Ibovespa composition, fetch prices, chart each ticker.
//!
//! Commands:
//! - `run` (default): print latest/mean close per ticker and write `<ticker>_chart.png`
//! - `tickers`: print the resolved ticker list and exit
//!
//! Logs go to stderr (`RUST_LOG` overrides the `info` default); stdout
//! carries only the report.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use ibovlab_core::chart::PngChartRenderer;
use ibovlab_core::clock::SystemClock;
use ibovlab_core::composition::{BrapiResolver, IndexResolver, StaticResolver, MARKET_SUFFIX};
use ibovlab_core::data::{CsvPriceProvider, PriceProvider, YahooProvider};
use ibovlab_core::http::{HttpClient, ReqwestHttpClient};
use ibovlab_runner::{
    exit_code, run_pipeline, summary_exit_code, ConfigError, PipelineError, RunConfig,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ibovlab",
    version,
    about = "IbovLab: Ibovespa price charts with moving averages"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices for every index member, print statistics, and write charts.
    Run(RunArgs),
    /// Resolve the index composition and print one ticker per line.
    Tickers(SourceArgs),
}

/// Where the configuration and the ticker list come from.
#[derive(Args, Default)]
struct SourceArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated tickers to use instead of the index composition
    /// (no BRAPI_TOKEN needed).
    #[arg(long, value_delimiter = ',')]
    tickers: Vec<String>,

    /// Keep repeated composition members.
    #[arg(long, default_value_t = false)]
    no_dedupe: bool,
}

#[derive(Args, Default)]
struct RunArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Start date (YYYY-MM-DD). Defaults to 2024-01-01.
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Directory for chart images. Defaults to the current directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Render charts on this many threads.
    #[arg(long)]
    jobs: Option<usize>,

    /// Read prices from a CSV file (date,ticker,open,high,low,close,volume)
    /// instead of Yahoo Finance.
    #[arg(long)]
    prices_csv: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let outcome = match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run_cmd(args),
        Commands::Tickers(args) => tickers_cmd(args),
    };

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(exit_code_for(&err));
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PipelineError>()
        .map(PipelineError::exit_code)
        .unwrap_or(exit_code::UNEXPECTED)
}

fn run_cmd(args: RunArgs) -> Result<i32> {
    let mut config = load_config(&args.source)?;
    if let Some(start) = args.start {
        config.start = start;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    config.validate().map_err(PipelineError::from)?;

    let http = http_client(&config)?;
    let resolver = build_resolver(&args.source, &config, http.clone())?;
    let provider: Box<dyn PriceProvider> = match args.prices_csv {
        Some(path) => Box::new(CsvPriceProvider::new(path)),
        None => Box::new(
            YahooProvider::new(http, Arc::new(SystemClock))
                .with_retry_policy(config.max_retries, Duration::from_millis(500)),
        ),
    };
    let renderer = PngChartRenderer::default();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = run_pipeline(resolver.as_ref(), provider.as_ref(), &renderer, &config, &mut out)?;

    for skipped in &summary.skipped {
        warn!(ticker = %skipped.ticker, reason = %skipped.reason, "not charted");
    }
    Ok(summary_exit_code(&summary))
}

fn tickers_cmd(args: SourceArgs) -> Result<i32> {
    let config = load_config(&args)?;
    let http = http_client(&config)?;
    let resolver = build_resolver(&args, &config, http)?;
    let tickers = resolver.resolve().map_err(PipelineError::from)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for ticker in &tickers {
        writeln!(out, "{ticker}").context("writing ticker list")?;
    }
    Ok(exit_code::SUCCESS)
}

fn load_config(args: &SourceArgs) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path).map_err(PipelineError::from)?,
        None => RunConfig::default(),
    };
    if args.no_dedupe {
        config.dedupe = false;
    }
    Ok(config)
}

fn http_client(config: &RunConfig) -> Result<Arc<dyn HttpClient>> {
    let client = ReqwestHttpClient::new(config.http_timeout()).context("building HTTP client")?;
    Ok(Arc::new(client))
}

fn build_resolver(
    args: &SourceArgs,
    config: &RunConfig,
    http: Arc<dyn HttpClient>,
) -> Result<Box<dyn IndexResolver>> {
    if !args.tickers.is_empty() {
        let resolver = StaticResolver::from_symbols(&args.tickers, MARKET_SUFFIX)
            .map_err(|e| PipelineError::Config(ConfigError::Invalid(format!("--tickers: {e}"))))?
            .with_dedupe(config.dedupe);
        return Ok(Box::new(resolver));
    }
    let resolver =
        BrapiResolver::from_env(http, config.composition_settings()).map_err(PipelineError::from)?;
    Ok(Box::new(resolver))
}
