//! Offline price provider backed by a long-format CSV file.
//!
//! Expected header: `date,ticker,open,high,low,close,volume`. Prices are
//! taken as already adjusted. Empty cells are absent values. Rows for
//! tickers that were not requested are ignored.

use super::align::align_tickers;
use super::provider::{DataError, DataSource, PriceProvider, RawBar};
use crate::domain::{PriceTable, Ticker};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    ticker: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

impl CsvRow {
    fn into_bar(self) -> RawBar {
        let close = self.close.unwrap_or(f64::NAN);
        RawBar {
            date: self.date,
            open: self.open.unwrap_or(f64::NAN),
            high: self.high.unwrap_or(f64::NAN),
            low: self.low.unwrap_or(f64::NAN),
            close,
            volume: self.volume.map(|v| v.max(0.0) as u64).unwrap_or(0),
            adj_close: close,
        }
    }
}

/// Reads prices from a CSV file instead of the network.
#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    path: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a table from any CSV reader (used by `fetch_prices` and tests).
    pub fn read_table<R: Read>(
        reader: R,
        tickers: &[Ticker],
        start: NaiveDate,
    ) -> Result<PriceTable, DataError> {
        let by_symbol: HashMap<&str, &Ticker> =
            tickers.iter().map(|t| (t.as_str(), t)).collect();
        let mut ticker_bars: HashMap<Ticker, Vec<RawBar>> = HashMap::new();

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        for (line, row) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| DataError::Csv(format!("record {}: {e}", line + 1)))?;
            if row.date < start {
                continue;
            }
            let Some(ticker) = by_symbol.get(row.ticker.as_str()) else {
                continue;
            };
            ticker_bars
                .entry((*ticker).clone())
                .or_default()
                .push(row.into_bar());
        }

        Ok(align_tickers(tickers, ticker_bars))
    }
}

impl PriceProvider for CsvPriceProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn fetch_prices(&self, tickers: &[Ticker], start: NaiveDate) -> Result<PriceTable, DataError> {
        info!(path = %self.path.display(), tickers = tickers.len(), "loading prices from CSV");
        let file = std::fs::File::open(&self.path)
            .map_err(|e| DataError::Csv(format!("open {}: {e}", self.path.display())))?;
        Self::read_table(file, tickers, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceField;

    const CSV: &str = "\
date,ticker,open,high,low,close,volume
2023-12-29,AAA.SA,9,9,9,9,100
2024-01-02,AAA.SA,10,11,9,10.5,1000
2024-01-02,BBB.SA,20,21,19,20.5,2000
2024-01-03,AAA.SA,10.5,12,10,11.5,1500
2024-01-03,ZZZ.SA,1,1,1,1,1
2024-01-04,BBB.SA,,,,,
";

    fn t(s: &str) -> Ticker {
        Ticker::from_symbol(s, ".SA").unwrap()
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn reads_requested_tickers_from_start() {
        let table =
            CsvPriceProvider::read_table(CSV.as_bytes(), &[t("AAA"), t("BBB")], start()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.close_series(&t("AAA")).unwrap().closes(), vec![10.5, 11.5]);
        assert_eq!(table.close_series(&t("BBB")).unwrap().closes(), vec![20.5]);
        assert!(!table.contains(&t("ZZZ")));
    }

    #[test]
    fn empty_cells_are_absent() {
        let table = CsvPriceProvider::read_table(CSV.as_bytes(), &[t("BBB")], start()).unwrap();
        let close = table.column(PriceField::Close, &t("BBB")).unwrap();
        assert_eq!(close.last(), Some(&None));
    }

    #[test]
    fn ticker_without_rows_is_all_absent() {
        let table = CsvPriceProvider::read_table(CSV.as_bytes(), &[t("NONE")], start()).unwrap();
        assert!(table.close_series(&t("NONE")).unwrap().is_empty());
    }

    #[test]
    fn bad_date_is_csv_error() {
        let csv = "date,ticker,open,high,low,close,volume\nnot-a-date,AAA.SA,1,1,1,1,1\n";
        let err = CsvPriceProvider::read_table(csv.as_bytes(), &[t("AAA")], start()).unwrap_err();
        assert!(matches!(err, DataError::Csv(ref m) if m.contains("record 1")));
    }

    #[test]
    fn missing_file_is_csv_error() {
        let provider = CsvPriceProvider::new("/definitely/not/here.csv");
        let err = provider.fetch_prices(&[t("AAA")], start()).unwrap_err();
        assert!(matches!(err, DataError::Csv(_)));
    }
}
