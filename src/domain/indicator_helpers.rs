//! Shared helper functions for indicator calculations.

use std::collections::HashMap;

use crate::domain::indicator::adx::calculate_adx;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::levels::{calculate_resistance, calculate_support};
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stddev::calculate_stddev;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate(bars: &[Bar], indicator: &IndicatorType) -> IndicatorSeries {
    match indicator {
        IndicatorType::Sma(period) => calculate_sma(bars, *period),
        IndicatorType::Ema(span) => calculate_ema(bars, *span),
        IndicatorType::Rsi(period) => calculate_rsi(bars, *period),
        IndicatorType::Stddev(period) => calculate_stddev(bars, *period),
        IndicatorType::Atr { period, smoothing } => calculate_atr(bars, *period, *smoothing),
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => calculate_bollinger(bars, *period, *stddev_mult_x100),
        IndicatorType::Adx(period) => calculate_adx(bars, *period),
        IndicatorType::Support(window) => calculate_support(bars, *window),
        IndicatorType::Resistance(window) => calculate_resistance(bars, *window),
    }
}

/// Precomputes every requested indicator over the whole series.
pub fn compute_indicators(
    bars: &[Bar],
    indicators: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorSeries> {
    indicators
        .iter()
        .map(|indicator| (indicator.clone(), calculate(bars, indicator)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::AtrSmoothing;
    use chrono::NaiveDate;

    fn make_bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.7).sin();
                Bar {
                    timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap()
                        + chrono::Duration::hours(i as i64),
                    open: close,
                    high: close + 0.5,
                    low: close - 0.5,
                    close,
                }
            })
            .collect()
    }

    #[test]
    fn compute_indicators_keys_every_request() {
        let bars = make_bars(40);
        let wanted = vec![
            IndicatorType::Sma(5),
            IndicatorType::Ema(9),
            IndicatorType::Rsi(14),
            IndicatorType::Atr {
                period: 14,
                smoothing: AtrSmoothing::Mean,
            },
            IndicatorType::Bollinger {
                period: 20,
                stddev_mult_x100: 200,
            },
            IndicatorType::Adx(14),
            IndicatorType::Support(10),
            IndicatorType::Resistance(10),
        ];
        let map = compute_indicators(&bars, &wanted);

        assert_eq!(map.len(), wanted.len());
        for indicator in &wanted {
            let series = &map[indicator];
            assert_eq!(&series.indicator_type, indicator);
            assert_eq!(series.len(), bars.len());
        }
    }

    #[test]
    fn nothing_is_valid_before_its_warmup() {
        let bars = make_bars(40);
        let wanted = vec![
            IndicatorType::Sma(20),
            IndicatorType::Rsi(14),
            IndicatorType::Adx(14),
            IndicatorType::Support(10),
        ];
        for (indicator, series) in compute_indicators(&bars, &wanted) {
            for point in &series.values[..indicator.warmup()] {
                assert!(!point.valid, "{} valid during warmup", indicator);
            }
        }
    }
}
