//! Exponential Moving Average indicator.
//!
//! α = 2/(span+1), EMA[0] = C[0], EMA[i] = α·C[i] + (1-α)·EMA[i-1].
//! No warmup: the series is defined from the first bar.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_ema(bars: &[Bar], span: usize) -> IndicatorSeries {
    if span == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Ema(span),
            values: bars
                .iter()
                .map(|b| IndicatorPoint::simple(b.timestamp, None))
                .collect(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut ema: Option<f64> = None;

    for bar in bars {
        let next = match ema {
            None => bar.close,
            Some(prev) => alpha * bar.close + (1.0 - alpha) * prev,
        };
        ema = Some(next);
        values.push(IndicatorPoint::simple(bar.timestamp, ema));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(span),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                open: close,
                high: close,
                low: close,
                close,
            })
            .collect()
    }

    #[test]
    fn ema_defined_from_first_bar() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_ema(&bars, 9);

        assert!(series.values.iter().all(|p| p.valid));
        assert_relative_eq!(series.simple_at(0).unwrap(), 10.0);
    }

    #[test]
    fn ema_recursive_calculation() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_ema(&bars, 3);

        let alpha = 2.0 / 4.0;
        let e1 = alpha * 20.0 + (1.0 - alpha) * 10.0;
        let e2 = alpha * 30.0 + (1.0 - alpha) * e1;
        assert_relative_eq!(series.simple_at(1).unwrap(), e1);
        assert_relative_eq!(series.simple_at(2).unwrap(), e2);
    }

    #[test]
    fn ema_span_1_tracks_close() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_ema(&bars, 1);
        assert_relative_eq!(series.simple_at(2).unwrap(), 30.0);
    }

    #[test]
    fn ema_equal_prices() {
        let bars = make_bars(&[100.0; 5]);
        let series = calculate_ema(&bars, 3);
        for i in 0..5 {
            assert_relative_eq!(series.simple_at(i).unwrap(), 100.0);
        }
    }

    #[test]
    fn ema_span_0_is_undefined() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_ema(&bars, 0);
        assert_eq!(series.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn ema_empty_bars() {
        let series = calculate_ema(&[], 3);
        assert!(series.is_empty());
    }
}
