//! Outcome of a batch run, one entry per ticker.

use std::path::PathBuf;

/// A ticker that was reported and charted.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerReport {
    pub ticker: String,
    pub latest_close: f64,
    pub mean_close: f64,
    pub observations: usize,
    pub chart_path: PathBuf,
}

/// A ticker that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: String,
}

/// Successes and skips, each in ticker order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub succeeded: Vec<TickerReport>,
    pub skipped: Vec<SkippedTicker>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn chart_paths(&self) -> Vec<&PathBuf> {
        self.succeeded.iter().map(|r| &r.chart_path).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_counts_as_success() {
        let summary = RunSummary::default();
        assert_eq!(summary.total(), 0);
        assert!(summary.all_succeeded());
    }

    #[test]
    fn skip_marks_partial_failure() {
        let summary = RunSummary {
            succeeded: vec![TickerReport {
                ticker: "AAA.SA".into(),
                latest_close: 1.0,
                mean_close: 1.0,
                observations: 1,
                chart_path: PathBuf::from("AAA.SA_chart.png"),
            }],
            skipped: vec![SkippedTicker {
                ticker: "BBB.SA".into(),
                reason: "no close prices".into(),
            }],
        };
        assert_eq!(summary.total(), 2);
        assert!(!summary.all_succeeded());
        assert_eq!(summary.chart_paths(), vec![&PathBuf::from("AAA.SA_chart.png")]);
    }
}
