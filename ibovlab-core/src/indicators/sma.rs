//! Simple Moving Average (SMA).
//!
//! Rolling mean of closes over a lookback window.
//! Lookback: period - 1 (first defined value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// Create an SMA; `None` for a zero period.
    pub fn new(period: usize) -> Option<Self> {
        (period >= 1).then(|| Self {
            period,
            name: format!("sma_{period}"),
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, values: &[f64]) -> Vec<Option<f64>> {
        let n = values.len();
        let mut result = vec![None; n];

        if n < self.period {
            return result;
        }

        // Compute initial window sum
        let mut sum: f64 = values[..self.period].iter().sum();
        result[self.period - 1] = Some(sum / self.period as f64);

        // Roll the window forward
        for i in self.period..n {
            sum = sum - values[i - self.period] + values[i];
            result[i] = Some(sum / self.period as f64);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let values = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        let result = Sma::new(5).unwrap().compute(&values);

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_none(), "expected undefined at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4].unwrap(), 12.0, DEFAULT_EPSILON);
        // SMA[5] = mean(11,12,13,14,15) = 13.0
        assert_approx(result[5].unwrap(), 13.0, DEFAULT_EPSILON);
        // SMA[6] = mean(12,13,14,15,16) = 14.0
        assert_approx(result[6].unwrap(), 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_identity() {
        let result = Sma::new(1).unwrap().compute(&[100.0, 200.0, 300.0]);
        assert_eq!(result, vec![Some(100.0), Some(200.0), Some(300.0)]);
    }

    #[test]
    fn sma_zero_period_rejected() {
        assert!(Sma::new(0).is_none());
    }

    #[test]
    fn sma_lookback_and_name() {
        let sma = Sma::new(20).unwrap();
        assert_eq!(sma.lookback(), 19);
        assert_eq!(sma.name(), "sma_20");
        assert_eq!(Sma::new(1).unwrap().lookback(), 0);
    }

    #[test]
    fn sma_too_few_values() {
        let result = Sma::new(5).unwrap().compute(&[10.0, 11.0]);
        assert_eq!(result, vec![None, None]);
    }

    #[test]
    fn sma_exact_window_has_one_value() {
        let result = Sma::new(3).unwrap().compute(&[1.0, 2.0, 6.0]);
        assert_eq!(result, vec![None, None, Some(3.0)]);
    }

    #[test]
    fn sma_20_over_25_points_has_6_values() {
        let values: Vec<f64> = (0..25).map(|i| 10.0 + i as f64).collect();
        let result = Sma::new(20).unwrap().compute(&values);
        assert_eq!(result.iter().filter(|v| v.is_some()).count(), 6);
        // mean(10..=29) = 19.5
        assert_approx(result[19].unwrap(), 19.5, DEFAULT_EPSILON);
        assert_approx(result[24].unwrap(), 24.5, DEFAULT_EPSILON);
    }

    #[test]
    fn no_lookahead() {
        let values: Vec<f64> = (0..60).map(|i| (i as f64 * 0.7).sin() * 10.0 + 50.0).collect();
        let sma = Sma::new(20).unwrap();
        let full = sma.compute(&values);
        let truncated = sma.compute(&values[..40]);
        for i in 0..40 {
            assert_eq!(full[i], truncated[i]);
        }
    }
}
