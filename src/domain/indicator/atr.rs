//! True Range and Average True Range.
//!
//! TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|), undefined at i = 0.
//! ATR aggregates TR over a trailing window either as a mean or as a plain
//! sum; strategies pick one explicitly through [`AtrSmoothing`]. Inside the
//! window the first bar contributes its own H-L range, so ATR(n) is valid
//! from index n-1.

use crate::domain::indicator::{AtrSmoothing, IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

/// Standalone true range series. Index 0 is invalid (no previous close).
pub fn true_range_series(bars: &[Bar]) -> Vec<IndicatorPoint> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let tr = (i > 0).then(|| bar.true_range(bars[i - 1].close));
            IndicatorPoint::simple(bar.timestamp, tr)
        })
        .collect()
}

/// Per-bar range used inside rolling windows: H-L on the first bar.
pub(crate) fn window_ranges(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(bars: &[Bar], period: usize, smoothing: AtrSmoothing) -> IndicatorSeries {
    let ranges = window_ranges(bars);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if period == 0 || i + 1 < period {
                return IndicatorPoint::simple(bar.timestamp, None);
            }
            let sum: f64 = ranges[i + 1 - period..=i].iter().sum();
            let atr = match smoothing {
                AtrSmoothing::Mean => sum / period as f64,
                AtrSmoothing::Sum => sum,
            };
            IndicatorPoint::simple(bar.timestamp, Some(atr))
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Atr { period, smoothing },
        values,
    }
}
