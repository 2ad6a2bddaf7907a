//! Split/dividend adjustment.
//!
//! Auto-adjusted prices scale open, high, and low by `adj_close / close` and
//! replace the close with the adjusted close, so the whole history is
//! comparable to today's price. Volume is left untouched.

use super::provider::RawBar;

/// Apply auto-adjustment to one bar.
///
/// Bars without a usable adjusted close (missing, or a zero/missing raw
/// close) are returned unchanged.
pub fn auto_adjust(bar: RawBar) -> RawBar {
    if !bar.adj_close.is_finite() || !bar.close.is_finite() || bar.close == 0.0 {
        return bar;
    }
    let ratio = bar.adj_close / bar.close;
    RawBar {
        open: bar.open * ratio,
        high: bar.high * ratio,
        low: bar.low * ratio,
        close: bar.adj_close,
        ..bar
    }
}

pub fn auto_adjust_all(bars: Vec<RawBar>) -> Vec<RawBar> {
    bars.into_iter().map(auto_adjust).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(close: f64, adj_close: f64) -> RawBar {
        RawBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: close - 1.0,
            high: close + 2.0,
            low: close - 2.0,
            close,
            volume: 500,
            adj_close,
        }
    }

    #[test]
    fn scales_ohlc_by_adjustment_ratio() {
        let adjusted = auto_adjust(bar(100.0, 50.0));
        assert_eq!(adjusted.close, 50.0);
        assert_eq!(adjusted.open, 49.5);
        assert_eq!(adjusted.high, 51.0);
        assert_eq!(adjusted.low, 49.0);
        assert_eq!(adjusted.volume, 500);
    }

    #[test]
    fn missing_adj_close_leaves_bar_unchanged() {
        let adjusted = auto_adjust(bar(100.0, f64::NAN));
        assert_eq!(adjusted.close, 100.0);
        assert_eq!(adjusted.open, 99.0);
    }

    #[test]
    fn missing_close_leaves_bar_unchanged() {
        let adjusted = auto_adjust(bar(f64::NAN, 40.0));
        assert!(adjusted.close.is_nan());
        assert_eq!(adjusted.adj_close, 40.0);
    }

    #[test]
    fn no_adjustment_when_equal() {
        let adjusted = auto_adjust(bar(37.5, 37.5));
        assert_eq!(adjusted.open, 36.5);
        assert_eq!(adjusted.close, 37.5);
    }
}
