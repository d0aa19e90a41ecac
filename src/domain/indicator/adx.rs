//! Directional movement: +DI, -DI and the directional index.
//!
//! +DM = H - H[-1] when the high rose, else 0; -DM = L[-1] - L when the low
//! fell, else 0. TR, +DM and -DM are summed over the trailing window, then
//! DI = 100 · DM_sum / TR_sum and ADX = 100 · |+DI - -DI| / (+DI + -DI).
//!
//! A point is invalid when the TR sum or the DI sum is zero.

use crate::domain::indicator::atr::window_ranges;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::Bar;

fn invalid(bar: &Bar) -> IndicatorPoint {
    IndicatorPoint {
        timestamp: bar.timestamp,
        valid: false,
        value: IndicatorValue::Directional {
            plus_di: 0.0,
            minus_di: 0.0,
            adx: 0.0,
        },
    }
}

pub fn calculate_adx(bars: &[Bar], period: usize) -> IndicatorSeries {
    let ranges = window_ranges(bars);
    let mut plus_dm = Vec::with_capacity(bars.len());
    let mut minus_dm = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        if i == 0 {
            plus_dm.push(0.0);
            minus_dm.push(0.0);
            continue;
        }
        let prev = &bars[i - 1];
        plus_dm.push(if bar.high > prev.high {
            bar.high - prev.high
        } else {
            0.0
        });
        minus_dm.push(if bar.low < prev.low {
            prev.low - bar.low
        } else {
            0.0
        });
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if period == 0 || i + 1 < period {
                return invalid(bar);
            }
            let window = i + 1 - period..=i;
            let tr_sum: f64 = ranges[window.clone()].iter().sum();
            if tr_sum <= 0.0 {
                return invalid(bar);
            }
            let plus_di = 100.0 * plus_dm[window.clone()].iter().sum::<f64>() / tr_sum;
            let minus_di = 100.0 * minus_dm[window].iter().sum::<f64>() / tr_sum;
            let di_sum = plus_di + minus_di;
            if di_sum <= 0.0 {
                return invalid(bar);
            }
            IndicatorPoint {
                timestamp: bar.timestamp,
                valid: true,
                value: IndicatorValue::Directional {
                    plus_di,
                    minus_di,
                    adx: 100.0 * (plus_di - minus_di).abs() / di_sum,
                },
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Adx(period),
        values,
    }
}
