#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use pipsim::domain::error::PipsimError;
use pipsim::domain::indicator::{AtrSmoothing, IndicatorType};
use pipsim::domain::market_data::MarketData;
pub use pipsim::domain::ohlcv::Bar;
use pipsim::domain::position::Signal;
use pipsim::domain::signal::SignalDetector;
use pipsim::domain::strategy::{
    Account, EndOfData, ExitFill, Instrument, RiskConfig, ScanMode, StopBasis, Strategy,
    StrategyKind, TriggerPrice,
};
use pipsim::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub series: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, source: &str, bars: Vec<Bar>) -> Self {
        self.series.insert(source.to_string(), bars);
        self
    }

    pub fn with_error(mut self, source: &str, reason: &str) -> Self {
        self.errors.insert(source.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_bars(&self, source: &str) -> Result<Vec<Bar>, PipsimError> {
        if let Some(reason) = self.errors.get(source) {
            return Err(PipsimError::input(reason.clone()));
        }
        match self.series.get(source) {
            Some(bars) if !bars.is_empty() => Ok(bars.clone()),
            _ => Err(PipsimError::EmptySeries {
                series: source.to_string(),
            }),
        }
    }
}

/// Fires a fixed signal on chosen bars.
pub struct Scripted {
    signals: Vec<Signal>,
}

impl Scripted {
    pub fn new(len: usize, at: &[(usize, Signal)]) -> Self {
        let mut signals = vec![Signal::None; len];
        for &(i, s) in at {
            signals[i] = s;
        }
        Self { signals }
    }
}

impl SignalDetector for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        Vec::new()
    }

    fn detect(&self, _data: &MarketData, index: usize) -> Signal {
        self.signals.get(index).copied().unwrap_or(Signal::None)
    }
}

pub fn hour(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::hours(i as i64)
}

pub fn make_bar(i: usize, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        timestamp: hour(i),
        open: close,
        high,
        low,
        close,
    }
}

/// Hourly bars with a fixed 2 pip half-range around each close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c + 0.0002, c - 0.0002, c))
        .collect()
}

/// Closes stepping by `step` per bar for each `(count, step)` leg.
pub fn legs(start: f64, legs: &[(usize, f64)]) -> Vec<f64> {
    let mut closes = vec![start];
    for &(count, step) in legs {
        for _ in 0..count {
            let last = closes[closes.len() - 1];
            closes.push(last + step);
        }
    }
    closes
}

pub fn eurusd() -> Instrument {
    Instrument {
        pip_size: 0.0001,
        pip_value: 10.0,
        spread_pips: 0.0,
    }
}

pub fn fixed_pips_risk(stop_loss_pips: f64, take_profit_pips: f64) -> RiskConfig {
    RiskConfig {
        stop_basis: StopBasis::FixedPips {
            stop_loss_pips,
            take_profit_pips,
        },
        trigger: TriggerPrice::Close,
        fill: ExitFill::Level,
        exit_on_opposite: false,
        scan: ScanMode::Sequential,
        end_of_data: EndOfData::Discard,
    }
}

pub fn make_strategy(kind: StrategyKind, risk: RiskConfig) -> Strategy {
    Strategy {
        name: "test".into(),
        kind,
        atr_period: 14,
        atr_smoothing: AtrSmoothing::Mean,
        risk,
        instrument: eurusd(),
        account: Account {
            initial_balance: 10_000.0,
            risk_fraction: 0.0,
        },
    }
}
