//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over data sources (Yahoo Finance, CSV
//! import, in-memory fixtures) so the runner can swap implementations and
//! tests never touch the network.

use crate::domain::{PriceTable, Ticker};
use crate::http::TransportError;
use chrono::NaiveDate;
use thiserror::Error;

/// Raw daily OHLCV bar from a data provider (before adjustment/alignment).
///
/// Missing prices are `f64::NAN`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

/// Structured error types for data operations.
///
/// Every variant aborts the run; a ticker that simply has no data is not an
/// error and shows up as an all-absent column instead.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("provider error: HTTP {status} for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("CSV import error: {0}")]
    Csv(String),

    #[error("data error: {0}")]
    Other(String),
}

impl From<TransportError> for DataError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout(msg) | TransportError::Connect(msg) => {
                DataError::NetworkUnreachable(msg)
            }
            other => DataError::Other(other.to_string()),
        }
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Fixture,
}

/// Trait for price providers.
///
/// `fetch_prices` returns one table covering every requested ticker from
/// `start` (inclusive) through the provider's notion of today. The table's
/// ticker list mirrors `tickers`, duplicates included.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    fn fetch_prices(&self, tickers: &[Ticker], start: NaiveDate) -> Result<PriceTable, DataError>;
}
