//! Append-only record of closed trades.

use std::fmt;

use serde::Serialize;

use crate::domain::position::ClosedTrade;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    initial_balance: f64,
    trades: Vec<ClosedTrade>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerSummary {
    pub total_trades: usize,
    pub total_profit_loss: f64,
    pub final_balance: f64,
}

impl fmt::Display for LedgerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trades={} total_pl={:.2} final_balance={:.2}",
            self.total_trades, self.total_profit_loss, self.final_balance
        )
    }
}

/// One exported ledger line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub trade_type: String,
    pub entry_time: String,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub exit_time: String,
    pub exit_price: f64,
    pub exit_reason: String,
    pub pips: f64,
    pub profit_loss: f64,
    pub size: Option<f64>,
    /// Account balance after this trade.
    pub balance: f64,
}

impl Ledger {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            initial_balance,
            trades: Vec::new(),
        }
    }

    /// Appends a closed trade. Recorded trades are never changed.
    pub fn record(&mut self, trade: ClosedTrade) {
        self.trades.push(trade);
    }

    pub fn trades(&self) -> &[ClosedTrade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    pub fn total_profit_loss(&self) -> f64 {
        self.trades.iter().map(|t| t.profit_loss).sum()
    }

    pub fn balance(&self) -> f64 {
        self.initial_balance + self.total_profit_loss()
    }

    /// Balance after each trade, in order.
    pub fn running_balances(&self) -> Vec<f64> {
        self.trades
            .iter()
            .scan(self.initial_balance, |balance, trade| {
                *balance += trade.profit_loss;
                Some(*balance)
            })
            .collect()
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary {
            total_trades: self.trades.len(),
            total_profit_loss: self.total_profit_loss(),
            final_balance: self.balance(),
        }
    }

    pub fn rows(&self) -> Vec<LedgerRow> {
        self.trades
            .iter()
            .zip(self.running_balances())
            .map(|(t, balance)| LedgerRow {
                trade_type: t.side.to_string(),
                entry_time: t.entry_time.format(TIME_FORMAT).to_string(),
                entry_price: t.entry_price,
                stop_loss: t.stop_loss,
                take_profit: t.take_profit,
                exit_time: t.exit_time.format(TIME_FORMAT).to_string(),
                exit_price: t.exit_price,
                exit_reason: t.exit_reason.to_string(),
                pips: t.pips,
                profit_loss: t.profit_loss,
                size: t.size,
                balance,
            })
            .collect()
    }
}
