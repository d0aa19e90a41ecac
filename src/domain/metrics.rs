//! Trade statistics derived from a ledger.

use super::ledger::Ledger;
use super::position::ExitReason;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_trades: usize,
    pub total_return: f64,
    pub total_pips: f64,
    /// Largest peak-to-trough fall of the running balance, as a fraction.
    pub max_drawdown: f64,
    /// Most consecutive trades spent below a balance peak.
    pub max_drawdown_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub avg_trade_hours: f64,
    pub exits: ExitCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExitCounts {
    pub stop_loss: usize,
    pub take_profit: usize,
    pub opposite_signal: usize,
    pub end_of_data: usize,
}

impl ExitCounts {
    fn add(&mut self, reason: ExitReason) {
        match reason {
            ExitReason::StopLoss => self.stop_loss += 1,
            ExitReason::TakeProfit => self.take_profit += 1,
            ExitReason::OppositeSignal => self.opposite_signal += 1,
            ExitReason::EndOfData => self.end_of_data += 1,
        }
    }
}

impl Metrics {
    pub fn compute(ledger: &Ledger) -> Self {
        let trades = ledger.trades();
        let initial_balance = ledger.initial_balance();

        let total_return = if initial_balance > 0.0 {
            ledger.total_profit_loss() / initial_balance
        } else {
            0.0
        };

        let mut balances = Vec::with_capacity(trades.len() + 1);
        balances.push(initial_balance);
        balances.extend(ledger.running_balances());
        let (max_drawdown, max_drawdown_trades) = compute_drawdown(&balances);

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut total_pips = 0.0_f64;
        let mut total_minutes = 0i64;
        let mut exits = ExitCounts::default();

        for trade in trades {
            let pnl = trade.profit_loss;
            if pnl > 0.0 {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < 0.0 {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }

            total_pips += trade.pips;
            total_minutes += (trade.exit_time - trade.entry_time).num_minutes();
            exits.add(trade.exit_reason);
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / trades_won as f64
        } else {
            0.0
        };

        let avg_loss = if trades_lost > 0 {
            total_losses / trades_lost as f64
        } else {
            0.0
        };

        let avg_trade_hours = if total_trades > 0 {
            total_minutes as f64 / 60.0 / total_trades as f64
        } else {
            0.0
        };

        Metrics {
            total_trades,
            total_return,
            total_pips,
            max_drawdown,
            max_drawdown_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            avg_trade_hours,
            exits,
        }
    }
}

fn compute_drawdown(balances: &[f64]) -> (f64, usize) {
    let Some(&first) = balances.first() else {
        return (0.0, 0);
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    let mut current_run = 0usize;
    let mut max_run = 0usize;

    for &balance in balances {
        if balance >= peak {
            peak = balance;
            current_run = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - balance) / peak);
            current_run += 1;
            max_run = max_run.max(current_run);
        }
    }

    (max_dd, max_run)
}
