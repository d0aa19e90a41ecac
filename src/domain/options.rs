//! Option premium backtest: writing one option every bar at a fixed strike.

use std::fmt;
use std::str::FromStr;

use super::error::PipsimError;
use super::ohlcv::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Value of the option at expiry for an underlying at `price`.
    pub fn intrinsic_value(self, strike: f64, price: f64) -> f64 {
        match self {
            OptionType::Call => (price - strike).max(0.0),
            OptionType::Put => (strike - price).max(0.0),
        }
    }
}

impl FromStr for OptionType {
    type Err = PipsimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(OptionType::Call),
            "put" => Ok(OptionType::Put),
            _ => Err(PipsimError::UnknownOption {
                kind: "option type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// Writer's total profit/loss: `premium` collected per bar, less the
/// intrinsic value owed at that bar's close.
///
/// Intrinsic value is always a cost to the writer. It is subtracted, never
/// added, so a bar that finishes in the money can only reduce the total.
pub fn backtest_option_premium(
    bars: &[Bar],
    strike: f64,
    option_type: OptionType,
    premium: f64,
) -> Result<f64, PipsimError> {
    if bars.is_empty() {
        return Err(PipsimError::EmptySeries {
            series: "option underlying".to_string(),
        });
    }
    if !strike.is_finite() || !premium.is_finite() {
        return Err(PipsimError::input("strike and premium must be finite"));
    }

    Ok(bars
        .iter()
        .map(|bar| premium - option_type.intrinsic_value(strike, bar.close))
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                open: c,
                high: c,
                low: c,
                close: c,
            })
            .collect()
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Put".parse::<OptionType>().unwrap(), OptionType::Put);
        assert_eq!("CALL".parse::<OptionType>().unwrap(), OptionType::Call);
    }

    #[test]
    fn unknown_option_type_is_configuration_error() {
        let err = "straddle".parse::<OptionType>().unwrap_err();
        assert!(matches!(
            err,
            PipsimError::UnknownOption {
                kind: "option type",
                ..
            }
        ));
    }

    #[test]
    fn put_writer_pays_when_below_strike() {
        // 2 + 2 + (2 - 5) = 1
        let pl = backtest_option_premium(&bars(&[110.0, 100.0, 95.0]), 100.0, OptionType::Put, 2.0)
            .unwrap();
        assert_relative_eq!(pl, 1.0);
    }

    #[test]
    fn call_writer_pays_when_above_strike() {
        // (1 - 10) + 1 = -8
        let pl = backtest_option_premium(&bars(&[110.0, 90.0]), 100.0, OptionType::Call, 1.0)
            .unwrap();
        assert_relative_eq!(pl, -8.0);
    }

    #[test]
    fn in_the_money_never_adds_to_writer_pl() {
        let at_strike =
            backtest_option_premium(&bars(&[100.0]), 100.0, OptionType::Put, 2.0).unwrap();
        let deep =
            backtest_option_premium(&bars(&[60.0]), 100.0, OptionType::Put, 2.0).unwrap();
        assert_relative_eq!(at_strike, 2.0);
        assert_relative_eq!(deep, -38.0);
        assert!(deep < at_strike);
    }

    #[test]
    fn empty_series_is_an_error() {
        let err = backtest_option_premium(&[], 100.0, OptionType::Call, 1.0).unwrap_err();
        assert!(matches!(err, PipsimError::EmptySeries { .. }));
    }
}
