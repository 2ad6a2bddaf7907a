//! Test doubles shared by unit and integration tests across the workspace.
//!
//! None of these touch the network or, unless asked to, the filesystem.
//! Compiled for this crate's own tests and behind the `test-helpers`
//! feature for downstream test suites.

use crate::chart::{Chart, ChartError, ChartRenderer};
use crate::domain::{PriceTable, Ticker, TickerColumns};
use crate::http::{HttpClient, HttpResponse, TransportError};
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A request seen by `ScriptedHttpClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
}

/// HTTP client that replays scripted responses in order and records requests.
///
/// Running out of script is a transport error, so an unexpected extra call
/// fails loudly instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedHttpClient {
    pub fn new(responses: Vec<Result<HttpResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted response left".into())))
    }
}

/// Chart renderer that records what it was asked to draw and writes nothing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<(PathBuf, Chart)>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(PathBuf, Chart)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.calls().into_iter().map(|(p, _)| p).collect()
    }
}

impl ChartRenderer for RecordingRenderer {
    fn render_chart(&self, chart: &Chart, path: &Path) -> Result<(), ChartError> {
        chart.validate()?;
        self.calls
            .lock()
            .unwrap()
            .push((path.to_path_buf(), chart.clone()));
        Ok(())
    }
}

/// Chart renderer that fails for the listed file names and records the rest.
#[derive(Debug, Default)]
pub struct FailingRenderer {
    fail_for: Vec<String>,
    inner: RecordingRenderer,
}

impl FailingRenderer {
    pub fn failing_for(file_names: &[&str]) -> Self {
        Self {
            fail_for: file_names.iter().map(|s| s.to_string()).collect(),
            inner: RecordingRenderer::new(),
        }
    }

    pub fn rendered(&self) -> Vec<PathBuf> {
        self.inner.paths()
    }
}

impl ChartRenderer for FailingRenderer {
    fn render_chart(&self, chart: &Chart, path: &Path) -> Result<(), ChartError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if self.fail_for.contains(&name) {
            return Err(ChartError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.inner.render_chart(chart, path)
    }
}

/// Consecutive calendar dates starting 2024-01-02.
pub fn test_dates(n: usize) -> Vec<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date");
    (0..n)
        .map(|i| base + chrono::Duration::days(i as i64))
        .collect()
}

/// Build a table from close prices per bare symbol (suffix `.SA`).
///
/// All tickers share one date axis as long as the longest series; shorter
/// series are absent at the tail. Open/high/low mirror the close and volume
/// is 1000.
pub fn table_from_closes(series: &[(&str, &[f64])]) -> PriceTable {
    let len = series.iter().map(|(_, c)| c.len()).max().unwrap_or(0);
    let dates = test_dates(len);
    let mut tickers = Vec::new();
    let mut columns = HashMap::new();
    for (symbol, closes) in series {
        let ticker = Ticker::new(symbol, ".SA").expect("valid test symbol");
        let mut close: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
        close.resize(len, None);
        let volume = close.iter().map(|c| c.map(|_| 1000.0)).collect();
        columns.insert(
            ticker.clone(),
            TickerColumns {
                open: close.clone(),
                high: close.clone(),
                low: close.clone(),
                close,
                volume,
            },
        );
        tickers.push(ticker);
    }
    PriceTable::from_columns(dates, tickers, columns)
}
