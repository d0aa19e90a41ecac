//! Entry signal detectors.
//!
//! Each strategy variant is a [`SignalDetector`]: a pure function of the bar
//! at `index`, the bar before it, and indicator values at those two points.
//! A detector never looks past `index`. Any required indicator that is
//! undefined at the evaluation bar yields [`Signal::None`].

use crate::domain::indicator::IndicatorType;
use crate::domain::market_data::MarketData;
use crate::domain::position::Signal;
use crate::domain::strategy::StrategyKind;

pub trait SignalDetector {
    fn name(&self) -> &'static str;

    /// Indicators that must be present in the [`MarketData`] before
    /// [`detect`](SignalDetector::detect) is called.
    fn required_indicators(&self) -> Vec<IndicatorType>;

    /// First bar index at which a signal can fire.
    fn warmup(&self) -> usize {
        self.required_indicators()
            .iter()
            .map(IndicatorType::warmup)
            .max()
            .unwrap_or(0)
    }

    fn detect(&self, data: &MarketData, index: usize) -> Signal;
}

/// Builds the detector for a configured strategy kind.
pub fn detector_for(kind: &StrategyKind) -> Box<dyn SignalDetector> {
    match *kind {
        StrategyKind::EmaAdx {
            fast_period,
            slow_period,
            adx_period,
            adx_threshold,
        } => Box::new(EmaAdxCrossover::new(
            fast_period,
            slow_period,
            adx_period,
            adx_threshold,
        )),
        StrategyKind::MeanReversion {
            sma_period,
            rsi_period,
            oversold,
            overbought,
        } => Box::new(MeanReversion::new(
            sma_period, rsi_period, oversold, overbought,
        )),
        StrategyKind::BollingerRsi {
            bollinger_period,
            bollinger_mult_x100,
            rsi_period,
            oversold,
            overbought,
        } => Box::new(BollingerRsi::new(
            bollinger_period,
            bollinger_mult_x100,
            rsi_period,
            oversold,
            overbought,
        )),
        StrategyKind::SmaTrend {
            short_period,
            long_period,
        } => Box::new(SmaTrend::new(short_period, long_period)),
        StrategyKind::SwingBreakout {
            sma_period,
            level_window,
        } => Box::new(SwingBreakout::new(sma_period, level_window)),
        StrategyKind::CrossAsset => Box::new(CrossAssetBreach),
    }
}

fn simple(data: &MarketData, indicator: &IndicatorType, index: usize) -> Option<f64> {
    data.indicator(indicator)?.simple_at(index)
}

fn direction(long: bool, short: bool) -> Signal {
    match (long, short) {
        (true, false) => Signal::Long,
        (false, true) => Signal::Short,
        _ => Signal::None,
    }
}

/// EMA(fast) crossing EMA(slow), only while ADX is above a threshold.
#[derive(Debug, Clone)]
pub struct EmaAdxCrossover {
    fast: IndicatorType,
    slow: IndicatorType,
    adx: IndicatorType,
    adx_threshold: f64,
}

impl EmaAdxCrossover {
    pub fn new(fast_period: usize, slow_period: usize, adx_period: usize, adx_threshold: f64) -> Self {
        Self {
            fast: IndicatorType::Ema(fast_period),
            slow: IndicatorType::Ema(slow_period),
            adx: IndicatorType::Adx(adx_period),
            adx_threshold,
        }
    }

    fn evaluate(&self, data: &MarketData, index: usize) -> Option<Signal> {
        let prev = index.checked_sub(1)?;
        let fast = simple(data, &self.fast, index)?;
        let slow = simple(data, &self.slow, index)?;
        let fast_prev = simple(data, &self.fast, prev)?;
        let slow_prev = simple(data, &self.slow, prev)?;
        let (_, _, adx) = data.indicator(&self.adx)?.directional_at(index)?;

        if adx <= self.adx_threshold {
            return Some(Signal::None);
        }
        let crossed_up = fast > slow && fast_prev <= slow_prev;
        let crossed_down = fast < slow && fast_prev >= slow_prev;
        Some(direction(crossed_up, crossed_down))
    }
}

impl SignalDetector for EmaAdxCrossover {
    fn name(&self) -> &'static str {
        "ema_adx"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.fast.clone(), self.slow.clone(), self.adx.clone()]
    }

    fn warmup(&self) -> usize {
        self.adx.warmup().max(1)
    }

    fn detect(&self, data: &MarketData, index: usize) -> Signal {
        self.evaluate(data, index).unwrap_or(Signal::None)
    }
}

/// Close stretched away from its SMA with RSI at an extreme.
#[derive(Debug, Clone)]
pub struct MeanReversion {
    sma: IndicatorType,
    rsi: IndicatorType,
    oversold: f64,
    overbought: f64,
}

impl MeanReversion {
    pub fn new(sma_period: usize, rsi_period: usize, oversold: f64, overbought: f64) -> Self {
        Self {
            sma: IndicatorType::Sma(sma_period),
            rsi: IndicatorType::Rsi(rsi_period),
            oversold,
            overbought,
        }
    }

    fn evaluate(&self, data: &MarketData, index: usize) -> Option<Signal> {
        let close = data.bars.get(index)?.close;
        let sma = simple(data, &self.sma, index)?;
        let rsi = simple(data, &self.rsi, index)?;
        Some(direction(
            close < sma && rsi < self.oversold,
            close > sma && rsi > self.overbought,
        ))
    }
}

impl SignalDetector for MeanReversion {
    fn name(&self) -> &'static str {
        "mean_reversion"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.sma.clone(), self.rsi.clone()]
    }

    fn detect(&self, data: &MarketData, index: usize) -> Signal {
        self.evaluate(data, index).unwrap_or(Signal::None)
    }
}

/// Close outside a Bollinger band, confirmed by RSI.
#[derive(Debug, Clone)]
pub struct BollingerRsi {
    bands: IndicatorType,
    rsi: IndicatorType,
    oversold: f64,
    overbought: f64,
}

impl BollingerRsi {
    pub fn new(
        period: usize,
        stddev_mult_x100: u32,
        rsi_period: usize,
        oversold: f64,
        overbought: f64,
    ) -> Self {
        Self {
            bands: IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            },
            rsi: IndicatorType::Rsi(rsi_period),
            oversold,
            overbought,
        }
    }

    fn evaluate(&self, data: &MarketData, index: usize) -> Option<Signal> {
        let close = data.bars.get(index)?.close;
        let (upper, _, lower) = data.indicator(&self.bands)?.bands_at(index)?;
        let rsi = simple(data, &self.rsi, index)?;
        Some(direction(
            close <= lower && rsi < self.oversold,
            close >= upper && rsi > self.overbought,
        ))
    }
}

impl SignalDetector for BollingerRsi {
    fn name(&self) -> &'static str {
        "bollinger_rsi"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.bands.clone(), self.rsi.clone()]
    }

    fn detect(&self, data: &MarketData, index: usize) -> Signal {
        self.evaluate(data, index).unwrap_or(Signal::None)
    }
}

/// Fires on the bar where SMA(short) vs SMA(long) ordering flips.
#[derive(Debug, Clone)]
pub struct SmaTrend {
    short: IndicatorType,
    long: IndicatorType,
}

impl SmaTrend {
    pub fn new(short_period: usize, long_period: usize) -> Self {
        Self {
            short: IndicatorType::Sma(short_period),
            long: IndicatorType::Sma(long_period),
        }
    }

    /// +1 short above long, -1 below, 0 equal.
    fn regime(&self, data: &MarketData, index: usize) -> Option<i8> {
        let short = simple(data, &self.short, index)?;
        let long = simple(data, &self.long, index)?;
        Some(if short > long {
            1
        } else if short < long {
            -1
        } else {
            0
        })
    }

    fn evaluate(&self, data: &MarketData, index: usize) -> Option<Signal> {
        let now = self.regime(data, index)?;
        let before = self.regime(data, index.checked_sub(1)?)?;
        Some(direction(
            now == 1 && before != 1,
            now == -1 && before != -1,
        ))
    }
}

impl SignalDetector for SmaTrend {
    fn name(&self) -> &'static str {
        "sma_trend"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![self.short.clone(), self.long.clone()]
    }

    // The flip needs a defined regime on the previous bar too.
    fn warmup(&self) -> usize {
        self.short.warmup().max(self.long.warmup()) + 1
    }

    fn detect(&self, data: &MarketData, index: usize) -> Signal {
        self.evaluate(data, index).unwrap_or(Signal::None)
    }
}

/// Touch of the trailing swing level, filtered by the side of the SMA.
#[derive(Debug, Clone)]
pub struct SwingBreakout {
    sma: IndicatorType,
    support: IndicatorType,
    resistance: IndicatorType,
}

impl SwingBreakout {
    pub fn new(sma_period: usize, level_window: usize) -> Self {
        Self {
            sma: IndicatorType::Sma(sma_period),
            support: IndicatorType::Support(level_window),
            resistance: IndicatorType::Resistance(level_window),
        }
    }

    fn evaluate(&self, data: &MarketData, index: usize) -> Option<Signal> {
        let bar = data.bars.get(index)?;
        let sma = simple(data, &self.sma, index)?;
        let support = simple(data, &self.support, index)?;
        let resistance = simple(data, &self.resistance, index)?;
        Some(direction(
            bar.low <= support && bar.close > sma,
            bar.high >= resistance && bar.close < sma,
        ))
    }
}

impl SignalDetector for SwingBreakout {
    fn name(&self) -> &'static str {
        "swing_breakout"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        vec![
            self.sma.clone(),
            self.support.clone(),
            self.resistance.clone(),
        ]
    }

    fn detect(&self, data: &MarketData, index: usize) -> Signal {
        self.evaluate(data, index).unwrap_or(Signal::None)
    }
}

/// Reference series closing outside its own previous bar's range.
///
/// A reference close below the prior reference low reads as a divergence
/// the traded series should follow upward, and vice versa.
#[derive(Debug, Clone, Copy)]
pub struct CrossAssetBreach;

impl SignalDetector for CrossAssetBreach {
    fn name(&self) -> &'static str {
        "cross_asset"
    }

    fn required_indicators(&self) -> Vec<IndicatorType> {
        Vec::new()
    }

    fn warmup(&self) -> usize {
        1
    }

    fn detect(&self, data: &MarketData, index: usize) -> Signal {
        let Some(reference) = data.reference.as_ref() else {
            return Signal::None;
        };
        let (Some(prev), Some(bar)) = (
            index.checked_sub(1).and_then(|p| reference.get(p)),
            reference.get(index),
        ) else {
            return Signal::None;
        };
        direction(bar.close < prev.low, bar.close > prev.high)
    }
}
