//! Strategy configuration and composition.
//!
//! A [`Strategy`] names the entry detector to run ([`StrategyKind`]) and
//! carries everything the simulator needs to manage a trade: how stop and
//! target levels are placed, which price triggers them, how the instrument
//! converts price moves into pips and currency, and the account used for
//! sizing.

use std::fmt;
use std::str::FromStr;

use super::error::PipsimError;
use super::indicator::{AtrSmoothing, IndicatorType};

/// Price/pip/currency conversion for one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instrument {
    /// Decimal size of one pip, e.g. 0.0001 for EURUSD, 0.01 for USDJPY.
    pub pip_size: f64,
    /// Account currency per pip per standard lot.
    pub pip_value: f64,
    pub spread_pips: f64,
}

impl Instrument {
    pub fn to_pips(&self, price_delta: f64) -> f64 {
        price_delta / self.pip_size
    }

    pub fn pips_to_price(&self, pips: f64) -> f64 {
        pips * self.pip_size
    }

    pub fn pips_to_currency(&self, pips: f64) -> f64 {
        pips * self.pip_value
    }

    pub fn spread_price(&self) -> f64 {
        self.pips_to_price(self.spread_pips)
    }
}

/// Which part of a bar is compared against stop and target levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPrice {
    Close,
    /// Intrabar: low/high for longs, high/low for shorts.
    HighLow,
}

/// Price recorded when a stop or target fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitFill {
    Level,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Bar by bar, one state transition per bar.
    Sequential,
    /// From each entry, search the remaining bars for the first breach of
    /// each exit condition independently.
    Lookahead,
}

/// What happens to a position still open at the last bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfData {
    Discard,
    ForceClose,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopBasis {
    FixedPips {
        stop_loss_pips: f64,
        take_profit_pips: f64,
    },
    /// Distances are multiples of ATR at the entry bar. The ratio of the
    /// two multipliers is the risk-reward ratio.
    AtrMultiple {
        stop_mult: f64,
        take_profit_mult: f64,
    },
}

impl StopBasis {
    /// (stop distance, take-profit distance) in price units, or `None`
    /// when the basis needs an ATR that is missing or not positive.
    pub fn distances(&self, instrument: &Instrument, atr: Option<f64>) -> Option<(f64, f64)> {
        match *self {
            StopBasis::FixedPips {
                stop_loss_pips,
                take_profit_pips,
            } => Some((
                instrument.pips_to_price(stop_loss_pips),
                instrument.pips_to_price(take_profit_pips),
            )),
            StopBasis::AtrMultiple {
                stop_mult,
                take_profit_mult,
            } => {
                let atr = atr.filter(|a| *a > 0.0)?;
                Some((stop_mult * atr, take_profit_mult * atr))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskConfig {
    pub stop_basis: StopBasis,
    pub trigger: TriggerPrice,
    pub fill: ExitFill,
    pub exit_on_opposite: bool,
    pub scan: ScanMode,
    pub end_of_data: EndOfData,
}

impl Default for RiskConfig {
    fn default() -> Self {
        RiskConfig {
            stop_basis: StopBasis::AtrMultiple {
                stop_mult: 1.0,
                take_profit_mult: 2.0,
            },
            trigger: TriggerPrice::Close,
            fill: ExitFill::Level,
            exit_on_opposite: false,
            scan: ScanMode::Sequential,
            end_of_data: EndOfData::Discard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Account {
    pub initial_balance: f64,
    /// Fraction of balance risked per trade; 0 disables sizing.
    pub risk_fraction: f64,
}

impl Account {
    pub fn sizing_enabled(&self) -> bool {
        self.risk_fraction > 0.0
    }
}

/// Entry detector selection and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyKind {
    EmaAdx {
        fast_period: usize,
        slow_period: usize,
        adx_period: usize,
        adx_threshold: f64,
    },
    MeanReversion {
        sma_period: usize,
        rsi_period: usize,
        oversold: f64,
        overbought: f64,
    },
    BollingerRsi {
        bollinger_period: usize,
        bollinger_mult_x100: u32,
        rsi_period: usize,
        oversold: f64,
        overbought: f64,
    },
    SmaTrend {
        short_period: usize,
        long_period: usize,
    },
    SwingBreakout {
        sma_period: usize,
        level_window: usize,
    },
    CrossAsset,
}

impl StrategyKind {
    pub fn key(&self) -> &'static str {
        match self {
            StrategyKind::EmaAdx { .. } => "ema_adx",
            StrategyKind::MeanReversion { .. } => "mean_reversion",
            StrategyKind::BollingerRsi { .. } => "bollinger_rsi",
            StrategyKind::SmaTrend { .. } => "sma_trend",
            StrategyKind::SwingBreakout { .. } => "swing_breakout",
            StrategyKind::CrossAsset => "cross_asset",
        }
    }

    pub fn needs_reference(&self) -> bool {
        matches!(self, StrategyKind::CrossAsset)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub name: String,
    pub kind: StrategyKind,
    pub atr_period: usize,
    pub atr_smoothing: AtrSmoothing,
    pub risk: RiskConfig,
    pub instrument: Instrument,
    pub account: Account,
}

impl Strategy {
    pub fn atr_indicator(&self) -> IndicatorType {
        IndicatorType::Atr {
            period: self.atr_period,
            smoothing: self.atr_smoothing,
        }
    }

    /// ATR is read at entry for ATR-based levels and for sizing.
    pub fn needs_atr(&self) -> bool {
        matches!(self.risk.stop_basis, StopBasis::AtrMultiple { .. })
            || self.account.sizing_enabled()
    }
}

fn unknown(kind: &'static str, value: &str) -> PipsimError {
    PipsimError::UnknownOption {
        kind,
        value: value.to_string(),
    }
}

fn normalized(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('-', "_")
}

impl FromStr for TriggerPrice {
    type Err = PipsimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "close" => Ok(TriggerPrice::Close),
            "high_low" | "highlow" | "intrabar" => Ok(TriggerPrice::HighLow),
            _ => Err(unknown("trigger", s)),
        }
    }
}

impl FromStr for ExitFill {
    type Err = PipsimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "level" => Ok(ExitFill::Level),
            "close" => Ok(ExitFill::Close),
            _ => Err(unknown("fill", s)),
        }
    }
}

impl FromStr for ScanMode {
    type Err = PipsimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "sequential" => Ok(ScanMode::Sequential),
            "lookahead" => Ok(ScanMode::Lookahead),
            _ => Err(unknown("scan mode", s)),
        }
    }
}

impl FromStr for EndOfData {
    type Err = PipsimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "discard" => Ok(EndOfData::Discard),
            "force_close" => Ok(EndOfData::ForceClose),
            _ => Err(unknown("end of data policy", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn eurusd() -> Instrument {
        Instrument {
            pip_size: 0.0001,
            pip_value: 10.0,
            spread_pips: 1.5,
        }
    }

    fn sample_strategy() -> Strategy {
        Strategy {
            name: "EMA/ADX".into(),
            kind: StrategyKind::EmaAdx {
                fast_period: 9,
                slow_period: 21,
                adx_period: 14,
                adx_threshold: 25.0,
            },
            atr_period: 14,
            atr_smoothing: AtrSmoothing::Mean,
            risk: RiskConfig::default(),
            instrument: eurusd(),
            account: Account {
                initial_balance: 10_000.0,
                risk_fraction: 0.0,
            },
        }
    }

    #[test]
    fn instrument_conversions() {
        let inst = eurusd();
        assert_relative_eq!(inst.to_pips(0.0025), 25.0, epsilon = 1e-9);
        assert_relative_eq!(inst.pips_to_currency(25.0), 250.0);
        assert_relative_eq!(inst.spread_price(), 0.00015, epsilon = 1e-12);
    }

    #[test]
    fn jpy_pip_size_is_explicit() {
        let usdjpy = Instrument {
            pip_size: 0.01,
            pip_value: 9.0,
            spread_pips: 0.0,
        };
        assert_relative_eq!(usdjpy.to_pips(0.25), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn fixed_pip_distances_ignore_atr() {
        let basis = StopBasis::FixedPips {
            stop_loss_pips: 10.0,
            take_profit_pips: 30.0,
        };
        let (stop, take) = basis.distances(&eurusd(), None).unwrap();
        assert_relative_eq!(stop, 0.0010, epsilon = 1e-12);
        assert_relative_eq!(take, 0.0030, epsilon = 1e-12);
    }

    #[test]
    fn atr_distances_need_positive_atr() {
        let basis = StopBasis::AtrMultiple {
            stop_mult: 1.5,
            take_profit_mult: 3.0,
        };
        let (stop, take) = basis.distances(&eurusd(), Some(0.002)).unwrap();
        assert_relative_eq!(stop, 0.003, epsilon = 1e-12);
        assert_relative_eq!(take, 0.006, epsilon = 1e-12);
        assert_eq!(basis.distances(&eurusd(), Some(0.0)), None);
        assert_eq!(basis.distances(&eurusd(), None), None);
    }

    #[test]
    fn needs_atr_for_atr_levels_or_sizing() {
        let mut s = sample_strategy();
        assert!(s.needs_atr());

        s.risk.stop_basis = StopBasis::FixedPips {
            stop_loss_pips: 10.0,
            take_profit_pips: 20.0,
        };
        assert!(!s.needs_atr());

        s.account.risk_fraction = 0.01;
        assert!(s.needs_atr());
        assert_eq!(
            s.atr_indicator(),
            IndicatorType::Atr {
                period: 14,
                smoothing: AtrSmoothing::Mean
            }
        );
    }

    #[test]
    fn enum_options_parse() {
        assert_eq!("High-Low".parse::<TriggerPrice>().unwrap(), TriggerPrice::HighLow);
        assert_eq!("close".parse::<ExitFill>().unwrap(), ExitFill::Close);
        assert_eq!("LOOKAHEAD".parse::<ScanMode>().unwrap(), ScanMode::Lookahead);
        assert_eq!(
            "force_close".parse::<EndOfData>().unwrap(),
            EndOfData::ForceClose
        );
    }

    #[test]
    fn unknown_options_are_configuration_errors() {
        let err = "midpoint".parse::<TriggerPrice>().unwrap_err();
        assert_eq!(err.to_string(), "unknown trigger 'midpoint'");
        assert!(matches!(
            "zigzag".parse::<ScanMode>(),
            Err(PipsimError::UnknownOption {
                kind: "scan mode",
                ..
            })
        ));
    }

    #[test]
    fn kind_keys() {
        assert_eq!(sample_strategy().kind.to_string(), "ema_adx");
        assert!(StrategyKind::CrossAsset.needs_reference());
        assert!(!sample_strategy().kind.needs_reference());
    }
}
