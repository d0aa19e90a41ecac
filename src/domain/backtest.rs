//! Backtest orchestration.
//!
//! Inputs are loaded and validated up front; any failure there aborts the
//! run before a single bar is simulated. The simulation itself cannot fail.

use tracing::{debug, info};

use crate::domain::error::PipsimError;
use crate::domain::ledger::Ledger;
use crate::domain::market_data::MarketData;
use crate::domain::metrics::Metrics;
use crate::domain::signal::detector_for;
use crate::domain::simulator::Simulator;
use crate::domain::strategy::Strategy;
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub ledger: Ledger,
    pub metrics: Metrics,
    pub bars: usize,
    pub warmup: usize,
}

/// Loads the traded series and, for strategies that need one, the
/// reference series inner-joined to it on timestamp.
pub fn load_market_data(
    data_port: &dyn DataPort,
    strategy: &Strategy,
    primary: &str,
    reference: Option<&str>,
) -> Result<MarketData, PipsimError> {
    let bars = data_port.load_bars(primary)?;
    info!(source = primary, bars = bars.len(), "bars loaded");

    if !strategy.kind.needs_reference() {
        if let Some(reference) = reference {
            debug!(source = reference, kind = %strategy.kind, "reference series not used");
        }
        return MarketData::new(primary, bars);
    }

    let reference = reference.ok_or_else(|| PipsimError::ConfigMissing {
        section: "data".to_string(),
        key: "reference".to_string(),
    })?;
    let reference_bars = data_port.load_bars(reference)?;
    info!(source = reference, bars = reference_bars.len(), "reference bars loaded");

    let data = MarketData::with_reference(primary, bars, reference, reference_bars)?;
    info!(bars = data.bar_count(), "series joined on timestamp");
    Ok(data)
}

/// Computes the indicators the strategy needs and runs the simulator.
pub fn run_backtest(data: &mut MarketData, strategy: &Strategy) -> BacktestResult {
    let detector = detector_for(&strategy.kind);
    let simulator = Simulator::new(strategy, detector.as_ref());
    data.ensure_indicators(&simulator.required_indicators());

    let warmup = simulator.warmup();
    info!(
        strategy = %strategy.name,
        detector = detector.name(),
        bars = data.bar_count(),
        warmup,
        "running backtest"
    );

    let ledger = simulator.run(data);
    let metrics = Metrics::compute(&ledger);
    info!(
        trades = ledger.len(),
        total_profit_loss = ledger.total_profit_loss(),
        "backtest complete"
    );

    BacktestResult {
        ledger,
        metrics,
        bars: data.bar_count(),
        warmup,
    }
}
