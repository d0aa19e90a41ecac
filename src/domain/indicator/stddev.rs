//! Standard Deviation indicator.
//!
//! Sample standard deviation (n-1 denominator) over n closing prices.
//! Warmup: first (n-1) bars are invalid; a period below 2 is never valid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

/// Rolling sample standard deviation of `closes`, `None` during warmup.
pub(crate) fn rolling_sample_stddev(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|i| {
            if period < 2 || i + 1 < period {
                return None;
            }
            let window = &closes[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance = window
                .iter()
                .map(|c| {
                    let diff = c - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (period - 1) as f64;
            Some(variance.sqrt())
        })
        .collect()
}

pub fn calculate_stddev(bars: &[Bar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = bars
        .iter()
        .zip(rolling_sample_stddev(&closes, period))
        .map(|(bar, value)| IndicatorPoint::simple(bar.timestamp, value))
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Stddev(period),
        values,
    }
}
