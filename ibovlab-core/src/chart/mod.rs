//! Line charts of a close series and its moving averages.
//!
//! A `Chart` is a backend-independent description (date axis, traces,
//! labels). `ChartRenderer` turns it into a file; the PNG renderer is the
//! production backend.

pub mod png;

pub use png::PngChartRenderer;

use crate::domain::CloseSeries;
use crate::indicators::{Indicator, Sma};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to plot: {0}")]
    NoData(String),

    #[error("trace '{label}' has {got} values for {expected} dates")]
    LengthMismatch {
        label: String,
        got: usize,
        expected: usize,
    },

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One line on the chart, aligned to `Chart::dates`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

impl Trace {
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// Backend-independent chart description.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub dates: Vec<NaiveDate>,
    pub traces: Vec<Trace>,
}

impl Chart {
    /// Close price plus one SMA trace per window, titled after the ticker.
    ///
    /// Windows of zero are skipped.
    pub fn price_with_averages(series: &CloseSeries, windows: &[usize], currency: &str) -> Self {
        let closes = series.closes();
        let mut traces = vec![Trace {
            label: "Close".to_string(),
            values: closes.iter().copied().map(Some).collect(),
        }];
        for sma in windows.iter().filter_map(|&w| Sma::new(w)) {
            traces.push(Trace {
                label: format!("{}-day average", sma.period()),
                values: sma.compute(&closes),
            });
        }

        Self {
            title: format!("{} - Price and Moving Averages", series.ticker()),
            x_label: "Date".to_string(),
            y_label: format!("Price ({currency})"),
            dates: series.dates(),
            traces,
        }
    }

    /// Check that there is something to draw and every trace fits the date axis.
    pub fn validate(&self) -> Result<(), ChartError> {
        if self.dates.is_empty() {
            return Err(ChartError::NoData(self.title.clone()));
        }
        for trace in &self.traces {
            if trace.values.len() != self.dates.len() {
                return Err(ChartError::LengthMismatch {
                    label: trace.label.clone(),
                    got: trace.values.len(),
                    expected: self.dates.len(),
                });
            }
        }
        Ok(())
    }

    /// Min and max over every defined value, `None` if nothing is defined.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.traces
            .iter()
            .flat_map(|t| t.values.iter().flatten())
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Renders a chart to a file.
pub trait ChartRenderer: Send + Sync {
    /// Write `chart` to `path`, replacing any existing file.
    ///
    /// Backend resources are released before returning, on success and on
    /// failure.
    fn render_chart(&self, chart: &Chart, path: &Path) -> Result<(), ChartError>;
}

/// File name of a ticker's chart: `<ticker>_chart.png`.
pub fn chart_file_name(ticker: &str) -> String {
    format!("{ticker}_chart.png")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClosePoint, Ticker};

    fn series(n: usize) -> CloseSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points = (0..n)
            .map(|i| ClosePoint {
                date: base + chrono::Duration::days(i as i64),
                close: 10.0 + i as f64,
            })
            .collect();
        CloseSeries::new(Ticker::new("AAA", ".SA").unwrap(), points)
    }

    #[test]
    fn builds_three_traces() {
        let chart = Chart::price_with_averages(&series(25), &[20, 50], "BRL");
        assert_eq!(chart.title, "AAA.SA - Price and Moving Averages");
        assert_eq!(chart.y_label, "Price (BRL)");
        assert_eq!(chart.traces.len(), 3);
        assert_eq!(chart.traces[0].defined_count(), 25);
        assert_eq!(chart.traces[1].label, "20-day average");
        assert_eq!(chart.traces[1].defined_count(), 6);
        assert_eq!(chart.traces[2].defined_count(), 0);
        assert!(chart.validate().is_ok());
    }

    #[test]
    fn averages_never_longer_than_close() {
        let chart = Chart::price_with_averages(&series(7), &[20, 50], "BRL");
        for trace in &chart.traces {
            assert_eq!(trace.values.len(), chart.dates.len());
        }
    }

    #[test]
    fn empty_series_fails_validation() {
        let chart = Chart::price_with_averages(&series(0), &[20], "BRL");
        assert!(matches!(chart.validate(), Err(ChartError::NoData(_))));
        assert!(chart.value_range().is_none());
    }

    #[test]
    fn mismatched_trace_fails_validation() {
        let mut chart = Chart::price_with_averages(&series(3), &[], "BRL");
        chart.traces.push(Trace {
            label: "bad".into(),
            values: vec![Some(1.0)],
        });
        assert!(matches!(
            chart.validate(),
            Err(ChartError::LengthMismatch { got: 1, expected: 3, .. })
        ));
    }

    #[test]
    fn value_range_spans_all_traces() {
        let chart = Chart::price_with_averages(&series(5), &[2], "BRL");
        assert_eq!(chart.value_range(), Some((10.0, 14.0)));
    }

    #[test]
    fn file_name_uses_full_symbol() {
        assert_eq!(chart_file_name("PETR4.SA"), "PETR4.SA_chart.png");
    }
}
