//! Yahoo Finance price provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API, one request per
//! ticker, retrying transient failures with exponential backoff. Bars are
//! auto-adjusted for splits and dividends and aligned into a single
//! `PriceTable`.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. The CSV provider is the fallback when Yahoo is unavailable.

use super::adjust::auto_adjust_all;
use super::align::align_tickers;
use super::provider::{DataError, DataSource, PriceProvider, RawBar};
use crate::clock::Clock;
use crate::domain::{PriceTable, Ticker};
use crate::http::HttpClient;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const CHART_ENDPOINT: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Outcome of fetching one symbol.
#[derive(Debug)]
pub(crate) enum SymbolData {
    Bars(Vec<RawBar>),
    /// The provider has nothing for this symbol (delisted, unknown, or no
    /// trading days in the window).
    NoData(String),
}

/// Yahoo Finance price provider.
pub struct YahooProvider {
    http: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    endpoint: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(http: Arc<dyn HttpClient>, clock: Arc<dyn Clock>) -> Self {
        Self {
            http,
            clock,
            endpoint: CHART_ENDPOINT.to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    /// Override the retry budget and the first backoff delay.
    pub fn with_retry_policy(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Unix-second bounds covering `start` 00:00 through the end of `end` (UTC).
    fn period_bounds(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end_ts = (end + chrono::Duration::days(1))
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();
        (start_ts, end_ts)
    }

    /// Parse the chart API response into RawBars.
    ///
    /// Timestamps are shifted by the exchange's GMT offset before taking the
    /// date, so B3 sessions land on their local trading day.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<SymbolData, DataError> {
        let result = match resp.chart.result {
            Some(result) => result,
            None => {
                return match resp.chart.error {
                    Some(err) if err.code == "Not Found" => {
                        Ok(SymbolData::NoData(err.description))
                    }
                    Some(err) => Err(DataError::ResponseFormatChanged(format!(
                        "{}: {}",
                        err.code, err.description
                    ))),
                    None => Err(DataError::ResponseFormatChanged(format!(
                        "empty result with no error for {symbol}"
                    ))),
                };
            }
        };

        let Some(data) = result.into_iter().next() else {
            return Ok(SymbolData::NoData("result array is empty".into()));
        };

        // A valid symbol with no sessions in the window has no timestamps.
        let Some(timestamps) = data.timestamp else {
            return Ok(SymbolData::NoData("no trading days in range".into()));
        };

        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts + offset, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();
            let adj_close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());

            // Skip bars where all OHLCV are None (holidays/non-trading days)
            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            bars.push(RawBar {
                date,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume: volume.unwrap_or(0),
                adj_close: adj_close.unwrap_or(f64::NAN),
            });
        }

        if bars.is_empty() {
            return Ok(SymbolData::NoData("every bar in range is empty".into()));
        }

        Ok(SymbolData::Bars(bars))
    }

    /// Fetch one symbol with retry on timeouts, 429, and 5xx.
    pub(crate) fn fetch_symbol(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SymbolData, DataError> {
        let url = format!("{}/{symbol}", self.endpoint.trim_end_matches('/'));
        let (start_ts, end_ts) = Self::period_bounds(start, end);
        let period1 = start_ts.to_string();
        let period2 = end_ts.to_string();
        let query = [
            ("period1", period1.as_str()),
            ("period2", period2.as_str()),
            ("interval", "1d"),
            ("includeAdjustedClose", "true"),
        ];

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(symbol, attempt, ?delay, "retrying");
                std::thread::sleep(delay);
            }

            let resp = match self.http.get(&url, &query) {
                Ok(resp) => resp,
                Err(e) if e.is_transient() => {
                    last_error = Some(DataError::from(e));
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            match resp.status {
                200..=299 => {}
                404 => {
                    // Yahoo answers unknown symbols with 404 and a chart.error body
                    return match serde_json::from_str::<ChartResponse>(&resp.body) {
                        Ok(chart) => Self::parse_response(symbol, chart),
                        Err(_) => Ok(SymbolData::NoData("HTTP 404".into())),
                    };
                }
                401 | 403 => {
                    return Err(DataError::AuthenticationRequired(format!(
                        "Yahoo Finance refused the request for {symbol} (HTTP {})",
                        resp.status
                    )));
                }
                429 => {
                    last_error = Some(DataError::RateLimited {
                        retry_after_secs: resp.retry_after_secs.unwrap_or(60),
                    });
                    continue;
                }
                500..=599 => {
                    last_error = Some(DataError::Http {
                        status: resp.status,
                        symbol: symbol.to_string(),
                    });
                    continue;
                }
                status => {
                    return Err(DataError::Http {
                        status,
                        symbol: symbol.to_string(),
                    });
                }
            }

            let chart: ChartResponse = serde_json::from_str(&resp.body).map_err(|e| {
                DataError::ResponseFormatChanged(format!(
                    "failed to parse response for {symbol}: {e}"
                ))
            })?;
            return Self::parse_response(symbol, chart);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn fetch_prices(&self, tickers: &[Ticker], start: NaiveDate) -> Result<PriceTable, DataError> {
        if tickers.is_empty() {
            return Ok(PriceTable::empty());
        }

        let end = self.clock.today();
        info!(tickers = tickers.len(), %start, %end, "fetching daily prices from Yahoo Finance");

        let mut seen = HashSet::new();
        let mut ticker_bars: HashMap<Ticker, Vec<RawBar>> = HashMap::new();

        for ticker in tickers {
            if !seen.insert(ticker.clone()) {
                continue;
            }
            match self.fetch_symbol(ticker.as_str(), start, end)? {
                SymbolData::Bars(bars) => {
                    let bars: Vec<RawBar> = auto_adjust_all(bars)
                        .into_iter()
                        .filter(|b| b.date >= start)
                        .collect();
                    debug!(%ticker, bars = bars.len(), "fetched");
                    ticker_bars.insert(ticker.clone(), bars);
                }
                SymbolData::NoData(reason) => {
                    warn!(%ticker, %reason, "no price data; column left empty");
                }
            }
        }

        Ok(align_tickers(tickers, ticker_bars))
    }
}
