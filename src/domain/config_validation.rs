//! Configuration loading and validation.
//!
//! Every key is read and range-checked before a run starts. Missing keys
//! fall back to defaults except `[strategy] kind`; present but malformed
//! values are errors, never silently replaced.

use std::str::FromStr;

use crate::domain::error::PipsimError;
use crate::domain::indicator::AtrSmoothing;
use crate::domain::strategy::{
    Account, EndOfData, ExitFill, Instrument, RiskConfig, ScanMode, StopBasis, Strategy,
    StrategyKind, TriggerPrice,
};
use crate::ports::config_port::ConfigPort;

/// Builds a fully validated [`Strategy`] from `[strategy]`, `[risk]`,
/// `[instrument]` and `[account]`.
pub fn load_strategy(config: &dyn ConfigPort) -> Result<Strategy, PipsimError> {
    let kind = load_kind(config)?;
    let name = read_string(config, "strategy", "name").unwrap_or_else(|| kind.key().to_string());
    let atr_period = read_period(config, "strategy", "atr_period", 14)?;
    let atr_smoothing = read_choice(config, "strategy", "atr_smoothing", AtrSmoothing::Mean)?;

    Ok(Strategy {
        name,
        kind,
        atr_period,
        atr_smoothing,
        risk: load_risk(config)?,
        instrument: load_instrument(config)?,
        account: load_account(config)?,
    })
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), PipsimError> {
    load_strategy(config).map(|_| ())
}

fn load_kind(config: &dyn ConfigPort) -> Result<StrategyKind, PipsimError> {
    let raw = read_string(config, "strategy", "kind").ok_or_else(|| PipsimError::ConfigMissing {
        section: "strategy".to_string(),
        key: "kind".to_string(),
    })?;

    let kind = match raw.to_ascii_lowercase().replace('-', "_").as_str() {
        "ema_adx" => {
            let (fast_period, slow_period) =
                read_ordered_periods(config, ("fast_period", 9), ("slow_period", 21))?;
            let adx_threshold = read_f64(config, "strategy", "adx_threshold", 25.0)?;
            if !(0.0..=100.0).contains(&adx_threshold) {
                return Err(PipsimError::invalid(
                    "strategy",
                    "adx_threshold",
                    "adx_threshold must be between 0 and 100",
                ));
            }
            StrategyKind::EmaAdx {
                fast_period,
                slow_period,
                adx_period: read_period(config, "strategy", "adx_period", 14)?,
                adx_threshold,
            }
        }
        "mean_reversion" => {
            let (oversold, overbought) = read_rsi_bounds(config)?;
            StrategyKind::MeanReversion {
                sma_period: read_period(config, "strategy", "sma_period", 50)?,
                rsi_period: read_period(config, "strategy", "rsi_period", 14)?,
                oversold,
                overbought,
            }
        }
        "bollinger_rsi" => {
            let mult = read_f64(config, "strategy", "bollinger_mult", 2.0)?;
            // bands are keyed in hundredths, so smaller multipliers round to zero width
            if mult < 0.01 {
                return Err(PipsimError::invalid(
                    "strategy",
                    "bollinger_mult",
                    "bollinger_mult must be at least 0.01",
                ));
            }
            let (oversold, overbought) = read_rsi_bounds(config)?;
            StrategyKind::BollingerRsi {
                bollinger_period: read_period(config, "strategy", "bollinger_period", 20)?,
                bollinger_mult_x100: (mult * 100.0).round() as u32,
                rsi_period: read_period(config, "strategy", "rsi_period", 14)?,
                oversold,
                overbought,
            }
        }
        "sma_trend" => {
            let (short_period, long_period) =
                read_ordered_periods(config, ("short_period", 50), ("long_period", 200))?;
            StrategyKind::SmaTrend {
                short_period,
                long_period,
            }
        }
        "swing_breakout" => StrategyKind::SwingBreakout {
            sma_period: read_period(config, "strategy", "sma_period", 20)?,
            level_window: read_period(config, "strategy", "level_window", 14)?,
        },
        "cross_asset" => StrategyKind::CrossAsset,
        _ => {
            return Err(PipsimError::UnknownOption {
                kind: "strategy kind",
                value: raw,
            });
        }
    };
    Ok(kind)
}

fn load_risk(config: &dyn ConfigPort) -> Result<RiskConfig, PipsimError> {
    let defaults = RiskConfig::default();
    let basis = read_string(config, "risk", "stop_basis").unwrap_or_else(|| "atr".to_string());

    let stop_basis = match basis.to_ascii_lowercase().replace('-', "_").as_str() {
        "fixed_pips" | "pips" => StopBasis::FixedPips {
            stop_loss_pips: read_positive(config, "risk", "stop_loss_pips", 10.0)?,
            take_profit_pips: read_positive(config, "risk", "take_profit_pips", 20.0)?,
        },
        "atr" => StopBasis::AtrMultiple {
            stop_mult: read_positive(config, "risk", "stop_atr_mult", 1.0)?,
            take_profit_mult: read_positive(config, "risk", "take_profit_atr_mult", 2.0)?,
        },
        _ => {
            return Err(PipsimError::UnknownOption {
                kind: "stop basis",
                value: basis,
            });
        }
    };

    Ok(RiskConfig {
        stop_basis,
        trigger: read_choice::<TriggerPrice>(config, "risk", "trigger", defaults.trigger)?,
        fill: read_choice::<ExitFill>(config, "risk", "fill", defaults.fill)?,
        exit_on_opposite: read_bool(config, "risk", "exit_on_opposite", defaults.exit_on_opposite)?,
        scan: read_choice::<ScanMode>(config, "risk", "scan", defaults.scan)?,
        end_of_data: read_choice::<EndOfData>(config, "risk", "end_of_data", defaults.end_of_data)?,
    })
}

fn load_instrument(config: &dyn ConfigPort) -> Result<Instrument, PipsimError> {
    let spread_pips = read_f64(config, "instrument", "spread_pips", 0.0)?;
    if spread_pips < 0.0 {
        return Err(PipsimError::invalid(
            "instrument",
            "spread_pips",
            "spread_pips must be non-negative",
        ));
    }
    Ok(Instrument {
        pip_size: read_positive(config, "instrument", "pip_size", 0.0001)?,
        pip_value: read_positive(config, "instrument", "pip_value", 10.0)?,
        spread_pips,
    })
}

fn load_account(config: &dyn ConfigPort) -> Result<Account, PipsimError> {
    let risk_fraction = read_f64(config, "account", "risk_fraction", 0.0)?;
    if !(0.0..1.0).contains(&risk_fraction) {
        return Err(PipsimError::invalid(
            "account",
            "risk_fraction",
            "risk_fraction must be between 0 and 1",
        ));
    }
    Ok(Account {
        initial_balance: read_positive(config, "account", "initial_balance", 10_000.0)?,
        risk_fraction,
    })
}

fn read_rsi_bounds(config: &dyn ConfigPort) -> Result<(f64, f64), PipsimError> {
    let oversold = read_f64(config, "strategy", "oversold", 30.0)?;
    let overbought = read_f64(config, "strategy", "overbought", 70.0)?;
    for (key, value) in [("oversold", oversold), ("overbought", overbought)] {
        if !(0.0..=100.0).contains(&value) {
            return Err(PipsimError::invalid(
                "strategy",
                key,
                format!("{} must be between 0 and 100", key),
            ));
        }
    }
    if oversold >= overbought {
        return Err(PipsimError::invalid(
            "strategy",
            "oversold",
            "oversold must be below overbought",
        ));
    }
    Ok((oversold, overbought))
}

fn read_ordered_periods(
    config: &dyn ConfigPort,
    (short_key, short_default): (&str, usize),
    (long_key, long_default): (&str, usize),
) -> Result<(usize, usize), PipsimError> {
    let short = read_period(config, "strategy", short_key, short_default)?;
    let long = read_period(config, "strategy", long_key, long_default)?;
    if short >= long {
        return Err(PipsimError::invalid(
            "strategy",
            short_key,
            format!("{} must be less than {}", short_key, long_key),
        ));
    }
    Ok((short, long))
}

fn read_string(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, PipsimError> {
    match read_string(config, section, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| PipsimError::invalid(section, key, format!("'{}' is not a number", raw))),
    }
}

fn read_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, PipsimError> {
    let value = read_f64(config, section, key, default)?;
    if value <= 0.0 {
        return Err(PipsimError::invalid(
            section,
            key,
            format!("{} must be positive", key),
        ));
    }
    Ok(value)
}

fn read_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, PipsimError> {
    let value = match read_string(config, section, key) {
        None => default,
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            PipsimError::invalid(section, key, format!("'{}' is not a whole number", raw))
        })?,
    };
    if value < 1 {
        return Err(PipsimError::invalid(
            section,
            key,
            format!("{} must be at least 1", key),
        ));
    }
    Ok(value)
}

fn read_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: bool,
) -> Result<bool, PipsimError> {
    match read_string(config, section, key) {
        None => Ok(default),
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(PipsimError::invalid(
                section,
                key,
                format!("'{}' is not a boolean", raw),
            )),
        },
    }
}

fn read_choice<T>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, PipsimError>
where
    T: FromStr<Err = PipsimError>,
{
    match read_string(config, section, key) {
        None => Ok(default),
        Some(raw) => raw.parse(),
    }
}
