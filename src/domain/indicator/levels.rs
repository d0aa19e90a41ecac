//! Support and resistance levels.
//!
//! Two flavours exist and they are deliberately different types:
//!
//! - Trailing levels ([`calculate_support`], [`calculate_resistance`]) look at
//!   the `window` bars *before* the current one and are safe for signals.
//! - Centered levels ([`centered_levels`]) straddle the current bar and read
//!   future prices. They are non-causal, retrospective only, and come back as
//!   [`RetrospectiveLevels`] which no signal detector accepts.

use chrono::NaiveDateTime;

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Bar;

fn trailing<F>(bars: &[Bar], window: usize, pick: F) -> Vec<IndicatorPoint>
where
    F: Fn(&[Bar]) -> f64,
{
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let value = (window > 0 && i >= window).then(|| pick(&bars[i - window..i]));
            IndicatorPoint::simple(bar.timestamp, value)
        })
        .collect()
}

fn lowest_low(bars: &[Bar]) -> f64 {
    bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min)
}

fn highest_high(bars: &[Bar]) -> f64 {
    bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max)
}

/// Lowest low of the previous `window` bars.
pub fn calculate_support(bars: &[Bar], window: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Support(window),
        values: trailing(bars, window, lowest_low),
    }
}

/// Highest high of the previous `window` bars.
pub fn calculate_resistance(bars: &[Bar], window: usize) -> IndicatorSeries {
    IndicatorSeries {
        indicator_type: IndicatorType::Resistance(window),
        values: trailing(bars, window, highest_high),
    }
}

/// Centered support/resistance. Non-causal: for labelling history only.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrospectiveLevels {
    pub window: usize,
    pub timestamps: Vec<NaiveDateTime>,
    pub support: Vec<Option<f64>>,
    pub resistance: Vec<Option<f64>>,
}

impl RetrospectiveLevels {
    /// Indices where the bar's low touched its centered support.
    pub fn support_touches(&self, bars: &[Bar]) -> Vec<usize> {
        bars.iter()
            .zip(&self.support)
            .enumerate()
            .filter_map(|(i, (bar, level))| level.filter(|l| bar.low <= *l).map(|_| i))
            .collect()
    }

    /// Indices where the bar's high touched its centered resistance.
    pub fn resistance_touches(&self, bars: &[Bar]) -> Vec<usize> {
        bars.iter()
            .zip(&self.resistance)
            .enumerate()
            .filter_map(|(i, (bar, level))| level.filter(|l| bar.high >= *l).map(|_| i))
            .collect()
    }
}

/// Rolling min/max over a window centered on each bar.
///
/// The window for bar `i` is `[i + w/2 + 1 - w, i + w/2]`, so an even window
/// leans one bar into the future. Edges without a full window are `None`.
pub fn centered_levels(bars: &[Bar], window: usize) -> RetrospectiveLevels {
    let half = window / 2;
    let n = bars.len();
    let mut support = Vec::with_capacity(n);
    let mut resistance = Vec::with_capacity(n);

    for i in 0..n {
        let end = i + half;
        if window == 0 || end >= n || end + 1 < window {
            support.push(None);
            resistance.push(None);
            continue;
        }
        let slice = &bars[end + 1 - window..=end];
        support.push(Some(lowest_low(slice)));
        resistance.push(Some(highest_high(slice)));
    }

    RetrospectiveLevels {
        window,
        timestamps: bars.iter().map(|b| b.timestamp).collect(),
        support,
        resistance,
    }
}
