//! Per-ticker reporting: statistics on stdout and one chart per ticker.
//!
//! Failures are isolated per ticker. A ticker missing from the table, an
//! empty close series, or a chart that cannot be written is logged and
//! recorded in the summary; the batch carries on with the next ticker.

use crate::config::RunConfig;
use crate::summary::{RunSummary, SkippedTicker, TickerReport};
use chrono::NaiveDate;
use ibovlab_core::chart::{chart_file_name, Chart, ChartError, ChartRenderer};
use ibovlab_core::domain::{ClosePoint, PriceTable, Ticker};
use rayon::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a single ticker was skipped.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{ticker} is not in the price table")]
    MissingTicker { ticker: String },

    #[error("{ticker} has no close prices since {start}")]
    EmptySeries { ticker: String, start: NaiveDate },

    #[error("chart for {ticker} failed: {source}")]
    Chart {
        ticker: String,
        #[source]
        source: ChartError,
    },
}

/// Headline numbers for one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerStats {
    pub ticker: Ticker,
    pub latest: ClosePoint,
    pub mean: f64,
    pub observations: usize,
}

/// The stdout block for one ticker, including the leading blank line.
pub fn format_stats(stats: &TickerStats, start: NaiveDate) -> String {
    format!(
        "\nTicker: {}\nLatest close: {:.2}\nMean close since {}: {:.2}\n",
        stats.ticker, stats.latest.close, start, stats.mean
    )
}

/// Everything needed to print and draw one ticker.
#[derive(Debug)]
struct Prepared {
    stats: TickerStats,
    chart: Chart,
    path: PathBuf,
}

/// Prints statistics and renders charts for every ticker in a table.
pub struct Reporter<'a> {
    renderer: &'a dyn ChartRenderer,
    config: &'a RunConfig,
}

impl<'a> Reporter<'a> {
    pub fn new(renderer: &'a dyn ChartRenderer, config: &'a RunConfig) -> Self {
        Self { renderer, config }
    }

    /// Statistics and chart description for one ticker.
    pub fn ticker_stats(
        &self,
        table: &PriceTable,
        ticker: &Ticker,
    ) -> Result<(TickerStats, Chart), ReportError> {
        let series = table
            .close_series(ticker)
            .ok_or_else(|| ReportError::MissingTicker {
                ticker: ticker.to_string(),
            })?;
        let empty = || ReportError::EmptySeries {
            ticker: ticker.to_string(),
            start: self.config.start,
        };
        let latest = *series.latest().ok_or_else(empty)?;
        let mean = series.mean().ok_or_else(empty)?;

        let chart =
            Chart::price_with_averages(&series, &self.config.windows, &self.config.currency);
        let stats = TickerStats {
            ticker: ticker.clone(),
            latest,
            mean,
            observations: series.len(),
        };
        Ok((stats, chart))
    }

    fn prepare(&self, table: &PriceTable, ticker: &Ticker) -> Result<Prepared, ReportError> {
        let (stats, chart) = self.ticker_stats(table, ticker)?;
        let path = self.config.output_dir.join(chart_file_name(ticker.as_str()));
        Ok(Prepared { stats, chart, path })
    }

    fn render(&self, prepared: &Prepared) -> Result<(), ReportError> {
        self.renderer
            .render_chart(&prepared.chart, &prepared.path)
            .map_err(|source| ReportError::Chart {
                ticker: prepared.stats.ticker.to_string(),
                source,
            })?;
        info!(ticker = %prepared.stats.ticker, path = %prepared.path.display(), "chart written");
        Ok(())
    }

    /// Report every ticker in order.
    ///
    /// Statistics are always written to `out` in ticker order. With
    /// `jobs > 1` the charts are rendered afterwards on a rayon pool.
    /// Only a failure to write to `out` is returned as an error.
    pub fn report_all(
        &self,
        table: &PriceTable,
        tickers: &[Ticker],
        out: &mut dyn Write,
    ) -> std::io::Result<RunSummary> {
        let mut outcomes: Vec<Result<Prepared, ReportError>> = Vec::with_capacity(tickers.len());
        let parallel = self.config.jobs > 1 && tickers.len() > 1;

        for ticker in tickers {
            let prepared = self.prepare(table, ticker);
            if let Ok(p) = &prepared {
                out.write_all(format_stats(&p.stats, self.config.start).as_bytes())?;
                out.flush()?;
            }
            let outcome = match prepared {
                Ok(p) if !parallel => self.render(&p).map(|()| p),
                other => other,
            };
            outcomes.push(outcome);
        }

        if parallel {
            outcomes = self.render_parallel(outcomes);
        }

        let mut summary = RunSummary::default();
        for (ticker, outcome) in tickers.iter().zip(outcomes) {
            match outcome {
                Ok(p) => summary.succeeded.push(TickerReport {
                    ticker: ticker.to_string(),
                    latest_close: p.stats.latest.close,
                    mean_close: p.stats.mean,
                    observations: p.stats.observations,
                    chart_path: p.path,
                }),
                Err(e) => {
                    warn!(%ticker, error = %e, "ticker skipped");
                    summary.skipped.push(SkippedTicker {
                        ticker: ticker.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(summary)
    }

    fn render_parallel(
        &self,
        outcomes: Vec<Result<Prepared, ReportError>>,
    ) -> Vec<Result<Prepared, ReportError>> {
        let render_one = |outcome: Result<Prepared, ReportError>| {
            outcome.and_then(|p| self.render(&p).map(|()| p))
        };

        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .build()
        {
            Ok(pool) => {
                debug!(jobs = self.config.jobs, "rendering charts in parallel");
                pool.install(|| outcomes.into_par_iter().map(render_one).collect())
            }
            Err(e) => {
                warn!(error = %e, "thread pool unavailable, rendering sequentially");
                outcomes.into_iter().map(render_one).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibovlab_core::test_helpers::{table_from_closes, FailingRenderer, RecordingRenderer};

    fn t(s: &str) -> Ticker {
        Ticker::new(s, ".SA").unwrap()
    }

    fn config() -> RunConfig {
        RunConfig {
            output_dir: PathBuf::from("out"),
            ..RunConfig::default()
        }
    }

    fn run(
        renderer: &dyn ChartRenderer,
        config: &RunConfig,
        table: &PriceTable,
        tickers: &[Ticker],
    ) -> (String, RunSummary) {
        let mut out = Vec::new();
        let summary = Reporter::new(renderer, config)
            .report_all(table, tickers, &mut out)
            .unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[test]
    fn formats_two_decimals() {
        let stats = TickerStats {
            ticker: t("PETR4"),
            latest: ClosePoint {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                close: 37.5249,
            },
            mean: 36.1,
            observations: 40,
        };
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            format_stats(&stats, start),
            "\nTicker: PETR4.SA\nLatest close: 37.52\nMean close since 2024-01-01: 36.10\n"
        );
    }

    #[test]
    fn reports_in_ticker_order() {
        let table = table_from_closes(&[("AAA", &[1.0, 2.0, 3.0]), ("BBB", &[10.0, 20.0])]);
        let renderer = RecordingRenderer::new();
        let (out, summary) = run(&renderer, &config(), &table, &[t("BBB"), t("AAA")]);

        let bbb = out.find("Ticker: BBB.SA").unwrap();
        let aaa = out.find("Ticker: AAA.SA").unwrap();
        assert!(bbb < aaa);
        assert!(out.contains("Latest close: 3.00\nMean close since 2024-01-01: 2.00"));
        assert!(out.contains("Latest close: 20.00\nMean close since 2024-01-01: 15.00"));
        assert!(summary.all_succeeded());
        assert_eq!(
            renderer.paths(),
            vec![PathBuf::from("out/BBB.SA_chart.png"), PathBuf::from("out/AAA.SA_chart.png")]
        );
    }

    #[test]
    fn empty_series_is_skipped_without_output() {
        let table = table_from_closes(&[("AAA", &[1.0]), ("EMPTY", &[])]);
        let renderer = RecordingRenderer::new();
        let (out, summary) = run(&renderer, &config(), &table, &[t("EMPTY"), t("AAA")]);

        assert!(!out.contains("EMPTY"));
        assert!(out.contains("Ticker: AAA.SA"));
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].ticker, "EMPTY.SA");
        assert!(summary.skipped[0].reason.contains("no close prices"));
        assert_eq!(renderer.paths().len(), 1);
    }

    #[test]
    fn missing_ticker_is_skipped() {
        let table = table_from_closes(&[("AAA", &[1.0])]);
        let renderer = RecordingRenderer::new();
        let (_, summary) = run(&renderer, &config(), &table, &[t("ZZZ"), t("AAA")]);
        assert_eq!(summary.succeeded.len(), 1);
        assert!(summary.skipped[0].reason.contains("not in the price table"));
    }

    #[test]
    fn chart_failure_does_not_stop_batch() {
        let table = table_from_closes(&[("AAA", &[1.0, 2.0]), ("BBB", &[3.0, 4.0])]);
        let renderer = FailingRenderer::failing_for(&["AAA.SA_chart.png"]);
        let (out, summary) = run(&renderer, &config(), &table, &[t("AAA"), t("BBB")]);

        // stats are printed before the chart is attempted
        assert!(out.contains("Ticker: AAA.SA"));
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].ticker, "AAA.SA");
        assert_eq!(renderer.rendered(), vec![PathBuf::from("out/BBB.SA_chart.png")]);
    }

    #[test]
    fn parallel_rendering_keeps_output_and_summary_order() {
        let series: Vec<(String, Vec<f64>)> = (0..8)
            .map(|i| (format!("T{i}"), (0..30).map(|d| (i * 100 + d) as f64).collect()))
            .collect();
        let refs: Vec<(&str, &[f64])> = series
            .iter()
            .map(|(s, c)| (s.as_str(), c.as_slice()))
            .collect();
        let table = table_from_closes(&refs);
        let tickers: Vec<Ticker> = series.iter().map(|(s, _)| t(s)).collect();

        let sequential = RecordingRenderer::new();
        let (seq_out, seq_summary) = run(&sequential, &config(), &table, &tickers);

        let parallel = RecordingRenderer::new();
        let par_config = RunConfig { jobs: 4, ..config() };
        let (par_out, par_summary) = run(&parallel, &par_config, &table, &tickers);

        assert_eq!(seq_out, par_out);
        assert_eq!(seq_summary, par_summary);
        assert_eq!(parallel.paths().len(), 8);
    }

    #[test]
    fn chart_uses_configured_windows_and_currency() {
        let table = table_from_closes(&[("AAA", &[1.0, 2.0, 3.0, 4.0])]);
        let renderer = RecordingRenderer::new();
        let config = RunConfig {
            windows: vec![2],
            currency: "USD".into(),
            ..config()
        };
        run(&renderer, &config, &table, &[t("AAA")]);

        let (_, chart) = &renderer.calls()[0];
        assert_eq!(chart.y_label, "Price (USD)");
        assert_eq!(chart.traces.len(), 2);
        assert_eq!(chart.traces[1].defined_count(), 3);
    }
}
