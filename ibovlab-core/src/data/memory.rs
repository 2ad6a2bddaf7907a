//! In-memory price provider over a prebuilt table.

use super::provider::{DataError, DataSource, PriceProvider};
use crate::domain::{PriceField, PriceTable, Ticker, TickerColumns};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Serves slices of a fixed `PriceTable`.
///
/// Used for fixtures and replaying a table without network access; the
/// result is restricted to the requested tickers and to dates on or after
/// `start`.
#[derive(Debug, Clone)]
pub struct StaticPriceProvider {
    table: PriceTable,
}

impl StaticPriceProvider {
    pub fn new(table: PriceTable) -> Self {
        Self { table }
    }
}

impl PriceProvider for StaticPriceProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn source(&self) -> DataSource {
        DataSource::Fixture
    }

    fn fetch_prices(&self, tickers: &[Ticker], start: NaiveDate) -> Result<PriceTable, DataError> {
        if tickers.is_empty() {
            return Ok(PriceTable::empty());
        }

        let keep: Vec<usize> = self
            .table
            .dates()
            .iter()
            .enumerate()
            .filter(|(_, d)| **d >= start)
            .map(|(i, _)| i)
            .collect();
        let dates = keep.iter().map(|&i| self.table.dates()[i]).collect();
        let slice = |col: &[Option<f64>]| keep.iter().map(|&i| col[i]).collect::<Vec<_>>();

        let mut columns = HashMap::new();
        for ticker in tickers {
            if !self.table.contains(ticker) {
                continue;
            }
            let field = |f: PriceField| slice(self.table.column(f, ticker).unwrap_or_default());
            columns.insert(
                ticker.clone(),
                TickerColumns {
                    open: field(PriceField::Open),
                    high: field(PriceField::High),
                    low: field(PriceField::Low),
                    close: field(PriceField::Close),
                    volume: field(PriceField::Volume),
                },
            );
        }

        Ok(PriceTable::from_columns(dates, tickers.to_vec(), columns))
    }
}
