//! Multi-ticker daily price table.
//!
//! Conceptually a two-level table keyed by (field, ticker), every column
//! aligned to one shared ascending date axis. Missing observations are
//! `None`; nothing is forward-filled.

use super::{ClosePoint, CloseSeries, Ticker};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

/// OHLCV field selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    pub const ALL: [PriceField; 5] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::Volume,
    ];
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::Volume => "volume",
        };
        f.write_str(name)
    }
}

/// Columns for one ticker, each the same length as the table's date axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerColumns {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<f64>>,
}

impl TickerColumns {
    /// All-absent columns of the given length.
    pub fn absent(len: usize) -> Self {
        Self {
            open: vec![None; len],
            high: vec![None; len],
            low: vec![None; len],
            close: vec![None; len],
            volume: vec![None; len],
        }
    }

    pub fn field(&self, field: PriceField) -> &[Option<f64>] {
        match field {
            PriceField::Open => &self.open,
            PriceField::High => &self.high,
            PriceField::Low => &self.low,
            PriceField::Close => &self.close,
            PriceField::Volume => &self.volume,
        }
    }

    fn len(&self) -> usize {
        self.close.len()
    }
}

/// Read-only price table produced by a `PriceProvider`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<Ticker>,
    columns: HashMap<Ticker, TickerColumns>,
}

impl PriceTable {
    /// A table with no dates and no tickers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a table from a date axis and per-ticker columns.
    ///
    /// `tickers` keeps the caller's order (duplicates included). A ticker
    /// with no entry in `columns`, or whose columns do not match the date
    /// axis, gets all-absent columns.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        tickers: Vec<Ticker>,
        mut columns: HashMap<Ticker, TickerColumns>,
    ) -> Self {
        let len = dates.len();
        columns.retain(|ticker, cols| tickers.contains(ticker) && cols.len() == len);
        for ticker in &tickers {
            columns
                .entry(ticker.clone())
                .or_insert_with(|| TickerColumns::absent(len));
        }
        Self {
            dates,
            tickers,
            columns,
        }
    }

    /// Shared ascending date axis.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Tickers in the order they were requested.
    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    /// Number of rows (dates).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.columns.contains_key(ticker)
    }

    /// Column for (field, ticker), aligned to `dates()`.
    pub fn column(&self, field: PriceField, ticker: &Ticker) -> Option<&[Option<f64>]> {
        self.columns.get(ticker).map(|cols| cols.field(field))
    }

    /// Observed values of (field, ticker) paired with their dates.
    pub fn observations(
        &self,
        field: PriceField,
        ticker: &Ticker,
    ) -> Option<Vec<(NaiveDate, f64)>> {
        let column = self.column(field, ticker)?;
        Some(
            self.dates
                .iter()
                .zip(column)
                .filter_map(|(date, value)| value.map(|v| (*date, v)))
                .collect(),
        )
    }

    /// Close series for a ticker, `None` if the ticker is not in the table.
    ///
    /// Absent closes are dropped, so an all-absent column yields an empty series.
    pub fn close_series(&self, ticker: &Ticker) -> Option<CloseSeries> {
        let points = self
            .observations(PriceField::Close, ticker)?
            .into_iter()
            .map(|(date, close)| ClosePoint { date, close })
            .collect();
        Some(CloseSeries::new(ticker.clone(), points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn ticker(s: &str) -> Ticker {
        Ticker::new(s, ".SA").unwrap()
    }

    fn columns(closes: &[Option<f64>]) -> TickerColumns {
        TickerColumns {
            open: closes.to_vec(),
            high: closes.to_vec(),
            low: closes.to_vec(),
            close: closes.to_vec(),
            volume: closes.iter().map(|c| c.map(|_| 1000.0)).collect(),
        }
    }

    #[test]
    fn close_series_drops_absent_values() {
        let aaa = ticker("AAA");
        let mut cols = HashMap::new();
        cols.insert(aaa.clone(), columns(&[Some(10.0), None, Some(12.0)]));
        let table = PriceTable::from_columns(vec![d(2), d(3), d(4)], vec![aaa.clone()], cols);

        let series = table.close_series(&aaa).unwrap();
        assert_eq!(series.closes(), vec![10.0, 12.0]);
        assert_eq!(series.dates(), vec![d(2), d(4)]);
    }

    #[test]
    fn missing_ticker_gets_absent_column() {
        let aaa = ticker("AAA");
        let bbb = ticker("BBB");
        let mut cols = HashMap::new();
        cols.insert(aaa.clone(), columns(&[Some(10.0)]));
        let table = PriceTable::from_columns(vec![d(2)], vec![aaa, bbb.clone()], cols);

        assert!(table.contains(&bbb));
        assert_eq!(table.column(PriceField::Close, &bbb).unwrap(), &[None]);
        assert!(table.close_series(&bbb).unwrap().is_empty());
    }

    #[test]
    fn unknown_ticker_has_no_series() {
        let table = PriceTable::empty();
        assert!(table.close_series(&ticker("ZZZ")).is_none());
        assert!(table.is_empty());
        assert!(table.tickers().is_empty());
    }

    #[test]
    fn mismatched_column_length_is_replaced() {
        let aaa = ticker("AAA");
        let mut cols = HashMap::new();
        cols.insert(aaa.clone(), columns(&[Some(1.0), Some(2.0)]));
        let table = PriceTable::from_columns(vec![d(2)], vec![aaa.clone()], cols);
        assert_eq!(table.column(PriceField::Close, &aaa).unwrap(), &[None]);
    }

    #[test]
    fn field_display_names() {
        let names: Vec<String> = PriceField::ALL.iter().map(|f| f.to_string()).collect();
        assert_eq!(names, vec!["open", "high", "low", "close", "volume"]);
    }
}
