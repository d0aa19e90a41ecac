//! RSI (Relative Strength Index) indicator implementation.
//!
//! Average gain/loss are simple means over the trailing `period` close-to-close
//! changes, so the first valid point is at index `period`.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI saturates to 100.
//! If both are 0 (a perfectly flat window) the point is invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

pub fn calculate_rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    let mut gains = Vec::with_capacity(bars.len());
    let mut losses = Vec::with_capacity(bars.len());
    for pair in bars.windows(2) {
        let change = pair[1].close - pair[0].close;
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if period == 0 || i < period {
                return IndicatorPoint::simple(bar.timestamp, None);
            }
            // change index j covers bars (j, j+1), so bar i ends at change i-1
            let window = i - period..i;
            let avg_gain = gains[window.clone()].iter().sum::<f64>() / period as f64;
            let avg_loss = losses[window].iter().sum::<f64>() / period as f64;
            let rsi = if avg_loss > 0.0 {
                Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
            } else if avg_gain > 0.0 {
                Some(100.0)
            } else {
                None
            };
            IndicatorPoint::simple(bar.timestamp, rsi)
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
