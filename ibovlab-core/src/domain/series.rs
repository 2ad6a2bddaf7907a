//! Close-price series for a single ticker.

use super::Ticker;
use chrono::NaiveDate;

/// One observed close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Ascending (date, close) observations for one ticker.
///
/// Only observed values are kept; dates missing from the source are simply
/// not present, so consecutive points need not be consecutive days.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseSeries {
    ticker: Ticker,
    points: Vec<ClosePoint>,
}

impl CloseSeries {
    /// Build a series, sorting points by date.
    pub fn new(ticker: Ticker, mut points: Vec<ClosePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { ticker, points }
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn points(&self) -> &[ClosePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent observation, `None` for an empty series.
    pub fn latest(&self) -> Option<&ClosePoint> {
        self.points.last()
    }

    /// Arithmetic mean of every close, `None` for an empty series.
    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let sum: f64 = self.points.iter().map(|p| p.close).sum();
        Some(sum / self.points.len() as f64)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: &[f64]) -> CloseSeries {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| ClosePoint {
                date: base + chrono::Duration::days(i as i64),
                close,
            })
            .collect();
        CloseSeries::new(Ticker::new("TEST", ".SA").unwrap(), points)
    }

    #[test]
    fn latest_and_mean() {
        let s = series(&[10.0, 12.0, 11.0, 13.0]);
        assert_eq!(s.latest().unwrap().close, 13.0);
        assert_eq!(s.mean(), Some(11.5));
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn empty_series_has_no_stats() {
        let s = series(&[]);
        assert!(s.is_empty());
        assert!(s.latest().is_none());
        assert!(s.mean().is_none());
    }

    #[test]
    fn points_are_sorted_by_date() {
        let t = Ticker::new("TEST", ".SA").unwrap();
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let s = CloseSeries::new(
            t,
            vec![
                ClosePoint { date: d(5), close: 3.0 },
                ClosePoint { date: d(1), close: 1.0 },
                ClosePoint { date: d(4), close: 2.0 },
            ],
        );
        assert_eq!(s.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(s.latest().unwrap().date, d(5));
    }
}
