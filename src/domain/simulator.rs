//! Position simulator.
//!
//! A single-position state machine over one bar series. While flat, each
//! bar from the warm-up index onward is offered to the strategy's
//! [`SignalDetector`]; a Long/Short signal opens a position at that bar's
//! close (adjusted for spread) with stop and target levels fixed at entry.
//! While open, bars after the entry bar are checked for an exit in priority
//! order: stop-loss, take-profit, opposite signal. The position closes on
//! the first bar where any of them holds, and a [`ClosedTrade`] is appended
//! to the [`Ledger`]. Flat again, the next entry is considered from the
//! following bar.
//!
//! [`ScanMode::Lookahead`] reaches the same trades by searching forward
//! from each entry for the first bar on which each exit condition holds,
//! independently, and taking the earliest. Equal bars resolve in the same
//! priority order, so a bar that breaches both levels is a stop-loss.

use tracing::{debug, warn};

use crate::domain::indicator::IndicatorType;
use crate::domain::ledger::Ledger;
use crate::domain::market_data::MarketData;
use crate::domain::ohlcv::Bar;
use crate::domain::position::{ExitReason, Position};
use crate::domain::signal::SignalDetector;
use crate::domain::strategy::{EndOfData, ExitFill, ScanMode, Strategy};

/// Lots such that one ATR move costs `risk_fraction` of `balance`.
///
/// `None` when the per-lot risk is not positive.
pub fn position_size(balance: f64, risk_fraction: f64, atr: f64, pip_value: f64) -> Option<f64> {
    let per_lot_risk = atr * pip_value;
    if per_lot_risk > 0.0 && per_lot_risk.is_finite() {
        Some(balance * risk_fraction / per_lot_risk)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Exit {
    index: usize,
    reason: ExitReason,
    price: f64,
}

pub struct Simulator<'a> {
    strategy: &'a Strategy,
    detector: &'a dyn SignalDetector,
}

impl<'a> Simulator<'a> {
    pub fn new(strategy: &'a Strategy, detector: &'a dyn SignalDetector) -> Self {
        Self { strategy, detector }
    }

    /// Everything that must be computed on the data before [`run`](Self::run).
    pub fn required_indicators(&self) -> Vec<IndicatorType> {
        let mut indicators = self.detector.required_indicators();
        if self.strategy.needs_atr() {
            let atr = self.strategy.atr_indicator();
            if !indicators.contains(&atr) {
                indicators.push(atr);
            }
        }
        indicators
    }

    /// First bar at which an entry can be considered.
    pub fn warmup(&self) -> usize {
        let atr_warmup = if self.strategy.needs_atr() {
            self.strategy.atr_indicator().warmup()
        } else {
            0
        };
        self.detector.warmup().max(atr_warmup)
    }

    pub fn run(&self, data: &MarketData) -> Ledger {
        let mut ledger = Ledger::new(self.strategy.account.initial_balance);
        match self.strategy.risk.scan {
            ScanMode::Sequential => self.run_sequential(data, &mut ledger),
            ScanMode::Lookahead => self.run_lookahead(data, &mut ledger),
        }
        ledger
    }

    fn run_sequential(&self, data: &MarketData, ledger: &mut Ledger) {
        let mut open: Option<Position> = None;

        for index in self.warmup()..data.bars.len() {
            open = match open.take() {
                Some(position) => match self.exit_at(data, &position, index) {
                    Some(exit) => {
                        self.close(data, ledger, position, exit);
                        None
                    }
                    None => Some(position),
                },
                None => self.try_open(data, index, ledger.balance()),
            };
        }

        if let Some(position) = open {
            self.finish(data, ledger, position);
        }
    }

    fn run_lookahead(&self, data: &MarketData, ledger: &mut Ledger) {
        let mut index = self.warmup();

        while index < data.bars.len() {
            let Some(position) = self.try_open(data, index, ledger.balance()) else {
                index += 1;
                continue;
            };
            match self.first_exit(data, &position) {
                Some(exit) => {
                    index = exit.index + 1;
                    self.close(data, ledger, position, exit);
                }
                None => {
                    self.finish(data, ledger, position);
                    break;
                }
            }
        }
    }

    fn try_open(&self, data: &MarketData, index: usize, balance: f64) -> Option<Position> {
        let side = self.detector.detect(data, index).side()?;
        let bar = data.bars.get(index)?;
        let strategy = self.strategy;

        let atr = if strategy.needs_atr() {
            data.indicator(&strategy.atr_indicator())
                .and_then(|series| series.simple_at(index))
        } else {
            None
        };

        let Some((stop_distance, take_distance)) = strategy
            .risk
            .stop_basis
            .distances(&strategy.instrument, atr)
        else {
            debug!(timestamp = %bar.timestamp, "no usable ATR at signal bar, entry skipped");
            return None;
        };

        let size = if strategy.account.sizing_enabled() {
            let sized = atr.and_then(|atr| {
                position_size(
                    balance,
                    strategy.account.risk_fraction,
                    atr,
                    strategy.instrument.pip_value,
                )
            });
            match sized {
                Some(size) => Some(size),
                None => {
                    warn!(
                        timestamp = %bar.timestamp,
                        "ATR is zero or undefined, cannot size position; entry skipped"
                    );
                    return None;
                }
            }
        } else {
            None
        };

        let entry_price = bar.close + side.sign() * strategy.instrument.spread_price();
        let position = Position {
            side,
            entry_index: index,
            entry_time: bar.timestamp,
            entry_price,
            stop_loss: entry_price - side.sign() * stop_distance,
            take_profit: entry_price + side.sign() * take_distance,
            size,
        };

        if !position.levels_bracket_entry() {
            debug!(timestamp = %bar.timestamp, "degenerate stop/target levels, entry skipped");
            return None;
        }

        debug!(
            side = %position.side,
            entry_time = %position.entry_time,
            entry_price = position.entry_price,
            stop_loss = position.stop_loss,
            take_profit = position.take_profit,
            "position opened"
        );
        Some(position)
    }

    fn fill_price(&self, level: f64, bar: &Bar) -> f64 {
        match self.strategy.risk.fill {
            ExitFill::Level => level,
            ExitFill::Close => bar.close,
        }
    }

    fn opposite_signal(&self, data: &MarketData, position: &Position, index: usize) -> bool {
        self.strategy.risk.exit_on_opposite
            && self.detector.detect(data, index).side() == Some(position.side.opposite())
    }

    /// Exit on bar `index`, if any, in priority order.
    fn exit_at(&self, data: &MarketData, position: &Position, index: usize) -> Option<Exit> {
        let bar = data.bars.get(index)?;
        let trigger = self.strategy.risk.trigger;

        let (reason, price) = if position.should_stop_loss(bar, trigger) {
            (ExitReason::StopLoss, self.fill_price(position.stop_loss, bar))
        } else if position.should_take_profit(bar, trigger) {
            (ExitReason::TakeProfit, self.fill_price(position.take_profit, bar))
        } else if self.opposite_signal(data, position, index) {
            (ExitReason::OppositeSignal, bar.close)
        } else {
            return None;
        };
        Some(Exit {
            index,
            reason,
            price,
        })
    }

    /// Earliest exit after the entry bar. Each condition is searched on its
    /// own; on equal bars the priority order of [`exit_at`](Self::exit_at)
    /// decides.
    fn first_exit(&self, data: &MarketData, position: &Position) -> Option<Exit> {
        let bars = &data.bars;
        let trigger = self.strategy.risk.trigger;
        let forward = || position.entry_index + 1..bars.len();

        let stop = forward().find(|&i| position.should_stop_loss(&bars[i], trigger));
        let take = forward().find(|&i| position.should_take_profit(&bars[i], trigger));
        let opposite = if self.strategy.risk.exit_on_opposite {
            forward().find(|&i| self.opposite_signal(data, position, i))
        } else {
            None
        };

        // min_by_key keeps the first of equal keys, so listing order is priority.
        let (index, reason) = [
            stop.map(|i| (i, ExitReason::StopLoss)),
            take.map(|i| (i, ExitReason::TakeProfit)),
            opposite.map(|i| (i, ExitReason::OppositeSignal)),
        ]
        .into_iter()
        .flatten()
        .min_by_key(|&(i, _)| i)?;

        let bar = &bars[index];
        let price = match reason {
            ExitReason::StopLoss => self.fill_price(position.stop_loss, bar),
            ExitReason::TakeProfit => self.fill_price(position.take_profit, bar),
            _ => bar.close,
        };
        Some(Exit {
            index,
            reason,
            price,
        })
    }

    fn close(&self, data: &MarketData, ledger: &mut Ledger, position: Position, exit: Exit) {
        let exit_time = data.bars[exit.index].timestamp;
        let trade = position.close(exit_time, exit.price, exit.reason, &self.strategy.instrument);
        debug!(
            side = %trade.side,
            exit_time = %trade.exit_time,
            exit_price = trade.exit_price,
            reason = %trade.exit_reason,
            profit_loss = trade.profit_loss,
            "position closed"
        );
        ledger.record(trade);
    }

    fn finish(&self, data: &MarketData, ledger: &mut Ledger, position: Position) {
        let last = data.bars.len().saturating_sub(1);
        match self.strategy.risk.end_of_data {
            EndOfData::ForceClose if position.entry_index < last => {
                let exit = Exit {
                    index: last,
                    reason: ExitReason::EndOfData,
                    price: data.bars[last].close,
                };
                self.close(data, ledger, position, exit);
            }
            _ => warn!(
                side = %position.side,
                entry_time = %position.entry_time,
                "position still open at end of data, not recorded"
            ),
        }
    }
}
