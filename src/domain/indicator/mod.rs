//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values, aligned 1:1 with the bars
//!
//! Every series is causal: the point at index `i` only reads bars `..=i`.
//! The one exception, centered support/resistance, lives in [`levels`] and
//! returns its own type so it cannot be fed to a signal detector.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod levels;
pub mod rsi;
pub mod sma;
pub mod stddev;

use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

use super::error::PipsimError;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

impl IndicatorPoint {
    /// A `Simple` point that is valid only when `value` is present and finite.
    pub fn simple(timestamp: NaiveDateTime, value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => IndicatorPoint {
                timestamp,
                valid: true,
                value: IndicatorValue::Simple(v),
            },
            _ => IndicatorPoint {
                timestamp,
                valid: false,
                value: IndicatorValue::Simple(0.0),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Bands {
        upper: f64,
        middle: f64,
        lower: f64,
    },
    Directional {
        plus_di: f64,
        minus_di: f64,
        adx: f64,
    },
}

/// How true range is aggregated over the ATR window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtrSmoothing {
    Mean,
    Sum,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Stddev(usize),
    Atr {
        period: usize,
        smoothing: AtrSmoothing,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    Adx(usize),
    Support(usize),
    Resistance(usize),
}

impl IndicatorType {
    /// Index of the first bar at which this indicator can be valid.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Sma(period)
            | IndicatorType::Stddev(period)
            | IndicatorType::Bollinger { period, .. }
            | IndicatorType::Atr { period, .. }
            | IndicatorType::Adx(period) => period.saturating_sub(1),
            IndicatorType::Ema(_) => 0,
            IndicatorType::Rsi(period)
            | IndicatorType::Support(period)
            | IndicatorType::Resistance(period) => *period,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn valid_point(&self, index: usize) -> Option<&IndicatorPoint> {
        self.values.get(index).filter(|p| p.valid)
    }

    /// Scalar value at `index`, or `None` while undefined.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.valid_point(index)?.value {
            IndicatorValue::Simple(v) => Some(v),
            _ => None,
        }
    }

    /// (upper, middle, lower) at `index`, or `None` while undefined.
    pub fn bands_at(&self, index: usize) -> Option<(f64, f64, f64)> {
        match self.valid_point(index)?.value {
            IndicatorValue::Bands {
                upper,
                middle,
                lower,
            } => Some((upper, middle, lower)),
            _ => None,
        }
    }

    /// (+DI, -DI, ADX) at `index`, or `None` while undefined.
    pub fn directional_at(&self, index: usize) -> Option<(f64, f64, f64)> {
        match self.valid_point(index)?.value {
            IndicatorValue::Directional {
                plus_di,
                minus_di,
                adx,
            } => Some((plus_di, minus_di, adx)),
            _ => None,
        }
    }
}

impl fmt::Display for AtrSmoothing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtrSmoothing::Mean => write!(f, "mean"),
            AtrSmoothing::Sum => write!(f, "sum"),
        }
    }
}

impl FromStr for AtrSmoothing {
    type Err = PipsimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(AtrSmoothing::Mean),
            "sum" => Ok(AtrSmoothing::Sum),
            _ => Err(PipsimError::UnknownOption {
                kind: "atr smoothing",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Atr { period, smoothing } => {
                write!(f, "ATR({},{})", period, smoothing)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::Support(window) => write!(f, "SUPPORT({})", window),
            IndicatorType::Resistance(window) => write!(f, "RESISTANCE({})", window),
        }
    }
}
