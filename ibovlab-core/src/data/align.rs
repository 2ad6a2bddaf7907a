//! Multi-ticker time alignment.
//!
//! Given bars for several tickers, build a `PriceTable` on the union of
//! their dates. A ticker without a bar on some date gets an absent value
//! there (no forward-fill of price data).

use super::provider::RawBar;
use crate::domain::{PriceTable, Ticker, TickerColumns};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// Align bars for `tickers` onto a common ascending date axis.
///
/// Tickers missing from `ticker_bars` get all-absent columns. `NaN` prices
/// become `None`; a zero volume on a bar with no close is also absent.
/// When a ticker has two bars on the same date, the later one wins.
pub fn align_tickers(tickers: &[Ticker], ticker_bars: HashMap<Ticker, Vec<RawBar>>) -> PriceTable {
    // Collect the union of all dates
    let mut all_dates = BTreeSet::new();
    for bars in ticker_bars.values() {
        for bar in bars {
            all_dates.insert(bar.date);
        }
    }
    let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

    let mut columns: HashMap<Ticker, TickerColumns> = HashMap::new();
    for (ticker, bars) in &ticker_bars {
        let date_map: HashMap<NaiveDate, &RawBar> = bars.iter().map(|b| (b.date, b)).collect();

        let mut cols = TickerColumns::absent(dates.len());
        for (i, date) in dates.iter().enumerate() {
            let Some(bar) = date_map.get(date) else {
                continue;
            };
            cols.open[i] = present(bar.open);
            cols.high[i] = present(bar.high);
            cols.low[i] = present(bar.low);
            cols.close[i] = present(bar.close);
            cols.volume[i] = if cols.close[i].is_none() && bar.volume == 0 {
                None
            } else {
                Some(bar.volume as f64)
            };
        }
        columns.insert(ticker.clone(), cols);
    }

    PriceTable::from_columns(dates, tickers.to_vec(), columns)
}

fn present(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceField;

    fn bar(date: &str, close: f64) -> RawBar {
        RawBar {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000,
            adj_close: close,
        }
    }

    fn t(s: &str) -> Ticker {
        Ticker::new(s, ".SA").unwrap()
    }

    #[test]
    fn align_fills_missing_with_absent() {
        let mut input = HashMap::new();
        input.insert(
            t("PETR4"),
            vec![
                bar("2024-01-02", 100.0),
                bar("2024-01-03", 101.0),
                bar("2024-01-04", 102.0),
            ],
        );
        input.insert(
            t("VALE3"),
            vec![
                bar("2024-01-02", 200.0),
                // VALE3 missing 2024-01-03
                bar("2024-01-04", 202.0),
            ],
        );

        let table = align_tickers(&[t("PETR4"), t("VALE3")], input);

        assert_eq!(table.dates().len(), 3);
        let petr = table.column(PriceField::Close, &t("PETR4")).unwrap();
        let vale = table.column(PriceField::Close, &t("VALE3")).unwrap();
        assert_eq!(petr[1], Some(101.0));
        assert_eq!(vale[1], None);
        assert_eq!(table.column(PriceField::Volume, &t("VALE3")).unwrap()[1], None);
    }

    #[test]
    fn nan_prices_become_absent() {
        let mut b = bar("2024-01-02", 10.0);
        b.close = f64::NAN;
        b.volume = 0;
        let mut input = HashMap::new();
        input.insert(t("AAA"), vec![b]);

        let table = align_tickers(&[t("AAA")], input);
        assert_eq!(table.column(PriceField::Close, &t("AAA")).unwrap(), &[None]);
        assert_eq!(table.column(PriceField::Open, &t("AAA")).unwrap(), &[Some(9.0)]);
        assert_eq!(table.column(PriceField::Volume, &t("AAA")).unwrap(), &[None]);
    }

    #[test]
    fn unrequested_ticker_without_bars_is_all_absent() {
        let mut input = HashMap::new();
        input.insert(t("AAA"), vec![bar("2024-01-02", 10.0)]);

        let table = align_tickers(&[t("AAA"), t("GONE")], input);
        assert_eq!(table.tickers().len(), 2);
        assert!(table.close_series(&t("GONE")).unwrap().is_empty());
    }

    #[test]
    fn no_tickers_gives_empty_table() {
        let table = align_tickers(&[], HashMap::new());
        assert!(table.is_empty());
        assert!(table.tickers().is_empty());
    }
}
