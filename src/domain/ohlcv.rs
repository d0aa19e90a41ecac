//! OHLC bar representation and series validation.

use chrono::NaiveDateTime;

use super::error::PipsimError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Checks that a loaded series can be simulated.
///
/// Rejects an empty series, non-finite prices and timestamps that are not
/// strictly increasing (duplicates included).
pub fn validate_series(series: &str, bars: &[Bar]) -> Result<(), PipsimError> {
    if bars.is_empty() {
        return Err(PipsimError::EmptySeries {
            series: series.to_string(),
        });
    }

    for (index, bar) in bars.iter().enumerate() {
        let fields = [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ];
        if let Some(&(field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PipsimError::InvalidPrice {
                series: series.to_string(),
                index,
                field,
            });
        }
    }

    if let Some(index) = bars
        .windows(2)
        .position(|pair| pair[1].timestamp <= pair[0].timestamp)
    {
        return Err(PipsimError::NonMonotonicTimestamps {
            series: series.to_string(),
            index: index + 1,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample_bar() -> Bar {
        Bar {
            timestamp: at(15),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
        }
    }

    #[test]
    fn true_range_hl_dominates() {
        let bar = sample_bar();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((bar.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bar = sample_bar();
        // high-low=20, |110-70|=40, |90-70|=20 → 40
        assert!((bar.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let bar = sample_bar();
        // high-low=20, |110-130|=20, |90-130|=40 → 40
        assert!((bar.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_accepts_increasing_series() {
        let bars: Vec<Bar> = (1..=3)
            .map(|d| Bar {
                timestamp: at(d),
                ..sample_bar()
            })
            .collect();
        assert!(validate_series("EURUSD", &bars).is_ok());
    }

    #[test]
    fn validate_rejects_empty() {
        let err = validate_series("EURUSD", &[]).unwrap_err();
        assert!(matches!(err, PipsimError::EmptySeries { .. }));
    }

    #[test]
    fn validate_rejects_duplicate_timestamp() {
        let bars = vec![
            Bar {
                timestamp: at(1),
                ..sample_bar()
            },
            Bar {
                timestamp: at(2),
                ..sample_bar()
            },
            Bar {
                timestamp: at(2),
                ..sample_bar()
            },
        ];
        let err = validate_series("EURUSD", &bars).unwrap_err();
        assert!(matches!(
            err,
            PipsimError::NonMonotonicTimestamps { index: 2, .. }
        ));
    }

    #[test]
    fn validate_rejects_nan_price() {
        let bars = vec![Bar {
            close: f64::NAN,
            ..sample_bar()
        }];
        let err = validate_series("EURUSD", &bars).unwrap_err();
        assert!(matches!(
            err,
            PipsimError::InvalidPrice {
                field: "close",
                index: 0,
                ..
            }
        ));
    }
}
