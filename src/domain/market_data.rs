//! Market data bundle: the traded series, an optional reference series
//! aligned on timestamp, and the precomputed indicators.

use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};

use crate::domain::error::PipsimError;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::ohlcv::{validate_series, Bar};

#[derive(Debug, Clone)]
pub struct MarketData {
    pub symbol: String,
    pub bars: Vec<Bar>,
    /// Correlated series, same length and timestamps as `bars`.
    pub reference: Option<Vec<Bar>>,
    pub indicators: HashMap<IndicatorType, IndicatorSeries>,
}

impl MarketData {
    /// Validates `bars`; no indicators are computed yet.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, PipsimError> {
        let symbol = symbol.into();
        validate_series(&symbol, &bars)?;
        Ok(Self {
            symbol,
            bars,
            reference: None,
            indicators: HashMap::new(),
        })
    }

    /// Inner-joins `primary` and `reference` on exact timestamp.
    pub fn with_reference(
        symbol: impl Into<String>,
        primary: Vec<Bar>,
        reference_name: &str,
        reference: Vec<Bar>,
    ) -> Result<Self, PipsimError> {
        let symbol = symbol.into();
        validate_series(&symbol, &primary)?;
        validate_series(reference_name, &reference)?;

        let (primary, reference) = join_on_timestamp(&primary, &reference);
        if primary.is_empty() {
            return Err(PipsimError::EmptySeries {
                series: format!("{} joined with {}", symbol, reference_name),
            });
        }

        let mut data = Self::new(symbol, primary)?;
        data.reference = Some(reference);
        Ok(data)
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    /// Computes any of `indicators` not already present.
    pub fn ensure_indicators(&mut self, indicators: &[IndicatorType]) {
        let missing: Vec<IndicatorType> = indicators
            .iter()
            .filter(|i| !self.indicators.contains_key(i))
            .cloned()
            .collect();
        self.indicators
            .extend(compute_indicators(&self.bars, &missing));
    }

    pub fn indicator(&self, indicator: &IndicatorType) -> Option<&IndicatorSeries> {
        self.indicators.get(indicator)
    }
}

/// Keeps only rows whose timestamp appears in both series, in primary order.
pub fn join_on_timestamp(primary: &[Bar], reference: &[Bar]) -> (Vec<Bar>, Vec<Bar>) {
    let reference_by_ts: HashMap<NaiveDateTime, &Bar> =
        reference.iter().map(|b| (b.timestamp, b)).collect();
    let mut seen = HashSet::new();

    primary
        .iter()
        .filter(|bar| seen.insert(bar.timestamp))
        .filter_map(|bar| {
            reference_by_ts
                .get(&bar.timestamp)
                .map(|r| (bar.clone(), (*r).clone()))
        })
        .unzip()
}
