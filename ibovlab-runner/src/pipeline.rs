//! The batch run: resolve tickers, fetch prices, report each ticker.
//!
//! Stages run strictly in order and every stage before reporting is
//! fatal. Collaborators are injected so tests can run the whole pipeline
//! without the network.

use crate::config::{ConfigError, RunConfig};
use crate::reporter::Reporter;
use crate::summary::RunSummary;
use ibovlab_core::chart::ChartRenderer;
use ibovlab_core::composition::{IndexResolver, ResolveError};
use ibovlab_core::data::{DataError, PriceProvider};
use std::io::Write;
use thiserror::Error;
use tracing::info;

/// Progress line printed before the price download.
pub const DOWNLOAD_BANNER: &str = "Downloading market data...";

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const UNEXPECTED: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    pub const UPSTREAM_API: i32 = 3;
    pub const DATA_PROVIDER: i32 = 4;
    pub const PARTIAL_FAILURE: i32 = 5;
}

/// A fatal pipeline failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to resolve index composition: {0}")]
    Resolve(#[from] ResolveError),

    #[error("failed to fetch prices: {0}")]
    Data(#[from] DataError),

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl PipelineError {
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => exit_code::CONFIGURATION,
            PipelineError::Resolve(e) if e.is_configuration() => exit_code::CONFIGURATION,
            PipelineError::Resolve(_) => exit_code::UPSTREAM_API,
            PipelineError::Data(_) => exit_code::DATA_PROVIDER,
            PipelineError::Output(_) => exit_code::UNEXPECTED,
        }
    }
}

/// Exit code for a run that completed.
pub fn summary_exit_code(summary: &RunSummary) -> i32 {
    if summary.all_succeeded() {
        exit_code::SUCCESS
    } else {
        exit_code::PARTIAL_FAILURE
    }
}

/// Run the whole batch, writing the report to `out`.
pub fn run_pipeline(
    resolver: &dyn IndexResolver,
    provider: &dyn PriceProvider,
    renderer: &dyn ChartRenderer,
    config: &RunConfig,
    out: &mut dyn Write,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;

    info!(source = %resolver.describe(), "resolving tickers");
    let tickers = resolver.resolve()?;
    info!(count = tickers.len(), "tickers resolved");

    writeln!(out, "{DOWNLOAD_BANNER}")?;
    out.flush()?;
    info!(provider = provider.name(), start = %config.start, "fetching prices");
    let table = provider.fetch_prices(&tickers, config.start)?;
    info!(dates = table.len(), tickers = table.tickers().len(), "prices fetched");

    let summary = Reporter::new(renderer, config).report_all(&table, &tickers, out)?;
    info!(
        succeeded = summary.succeeded.len(),
        skipped = summary.skipped.len(),
        "run complete"
    );
    Ok(summary)
}
