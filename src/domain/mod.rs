//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod indicator_helpers;
pub mod ledger;
pub mod market_data;
pub mod metrics;
pub mod ohlcv;
pub mod options;
pub mod position;
pub mod signal;
pub mod simulator;
pub mod strategy;
