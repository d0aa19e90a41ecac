//! Open positions and closed trade records.

use chrono::NaiveDateTime;
use std::fmt;

use super::ohlcv::Bar;
use super::strategy::{Instrument, TriggerPrice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "Long"),
            Side::Short => write!(f, "Short"),
        }
    }
}

/// Entry decision for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    None,
    Long,
    Short,
}

impl Signal {
    pub fn side(self) -> Option<Side> {
        match self {
            Signal::None => None,
            Signal::Long => Some(Side::Long),
            Signal::Short => Some(Side::Short),
        }
    }
}

impl From<Side> for Signal {
    fn from(side: Side) -> Self {
        match side {
            Side::Long => Signal::Long,
            Side::Short => Signal::Short,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    OppositeSignal,
    /// Only produced when the run force-closes at the last bar.
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "StopLoss"),
            ExitReason::TakeProfit => write!(f, "TakeProfit"),
            ExitReason::OppositeSignal => write!(f, "OppositeSignal"),
            ExitReason::EndOfData => write!(f, "EndOfData"),
        }
    }
}

/// A position while it is open. Levels are fixed at entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub side: Side,
    pub entry_index: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub size: Option<f64>,
}

impl Position {
    /// Stop below and target above entry for longs, mirrored for shorts.
    pub fn levels_bracket_entry(&self) -> bool {
        match self.side {
            Side::Long => self.stop_loss < self.entry_price && self.entry_price < self.take_profit,
            Side::Short => self.take_profit < self.entry_price && self.entry_price < self.stop_loss,
        }
    }

    pub fn should_stop_loss(&self, bar: &Bar, trigger: TriggerPrice) -> bool {
        match (self.side, trigger) {
            (Side::Long, TriggerPrice::Close) => bar.close <= self.stop_loss,
            (Side::Long, TriggerPrice::HighLow) => bar.low <= self.stop_loss,
            (Side::Short, TriggerPrice::Close) => bar.close >= self.stop_loss,
            (Side::Short, TriggerPrice::HighLow) => bar.high >= self.stop_loss,
        }
    }

    pub fn should_take_profit(&self, bar: &Bar, trigger: TriggerPrice) -> bool {
        match (self.side, trigger) {
            (Side::Long, TriggerPrice::Close) => bar.close >= self.take_profit,
            (Side::Long, TriggerPrice::HighLow) => bar.high >= self.take_profit,
            (Side::Short, TriggerPrice::Close) => bar.close <= self.take_profit,
            (Side::Short, TriggerPrice::HighLow) => bar.low <= self.take_profit,
        }
    }

    /// Consumes the position and produces its one and only trade record.
    pub fn close(
        self,
        exit_time: NaiveDateTime,
        exit_price: f64,
        exit_reason: ExitReason,
        instrument: &Instrument,
    ) -> ClosedTrade {
        let pips = instrument.to_pips((exit_price - self.entry_price) * self.side.sign());
        ClosedTrade {
            side: self.side,
            entry_time: self.entry_time,
            entry_price: self.entry_price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            exit_time,
            exit_price,
            exit_reason,
            pips,
            profit_loss: instrument.pips_to_currency(pips),
            size: self.size,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub side: Side,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub pips: f64,
    pub profit_loss: f64,
    pub size: Option<f64>,
}
