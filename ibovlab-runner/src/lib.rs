//! IbovLab Runner: configuration, per-ticker reporting, and the batch pipeline.
//!
//! This crate builds on `ibovlab-core` to provide:
//! - `RunConfig` loaded from TOML with working defaults
//! - The per-ticker reporter (stdout statistics plus one chart per ticker)
//! - `run_pipeline`, the resolve → fetch → report orchestration
//! - `RunSummary` and the mapping from outcomes to exit codes

pub mod config;
pub mod pipeline;
pub mod reporter;
pub mod summary;

pub use config::{ConfigError, RunConfig};
pub use pipeline::{exit_code, run_pipeline, summary_exit_code, PipelineError, DOWNLOAD_BANNER};
pub use reporter::{format_stats, ReportError, Reporter, TickerStats};
pub use summary::{RunSummary, SkippedTicker, TickerReport};
