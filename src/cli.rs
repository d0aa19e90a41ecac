//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{load_market_data, run_backtest};
use crate::domain::config_validation::load_strategy;
use crate::domain::error::PipsimError;
use crate::domain::ledger::LedgerSummary;
use crate::domain::options::{backtest_option_premium, OptionType};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::ledger_port::LedgerPort;

const DEFAULT_OUTPUT: &str = "ledger.csv";

#[derive(Parser, Debug)]
#[command(name = "pipsim", about = "OHLC strategy backtester")]
pub struct Cli {
    /// trace, debug, info, warn or error
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write the trade ledger
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Overrides [data] primary
        #[arg(short, long)]
        data: Option<PathBuf>,
        /// Overrides [data] reference
        #[arg(short, long)]
        reference: Option<PathBuf>,
        /// Overrides [data] output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Backtest writing an option every bar at a fixed strike
    Options {
        #[arg(short, long)]
        data: PathBuf,
        #[arg(long)]
        strike: f64,
        #[arg(long)]
        option_type: String,
        #[arg(long)]
        premium: f64,
    },
}

/// Installs the global stderr subscriber. Unknown levels fall back to info.
pub fn init_tracing(log_level: &str) {
    let level = match log_level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    // a subscriber may already be set when embedded
    let _ = tracing::subscriber::set_global_default(subscriber);
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            data,
            reference,
            output,
        } => run_backtest_command(&config, data.as_deref(), reference.as_deref(), output.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Options {
            data,
            strike,
            option_type,
            premium,
        } => run_options(&data, strike, &option_type, premium),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, PipsimError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    info!(path = %path.display(), "config loaded");
    Ok(adapter)
}

/// CLI flag first, then the `[data]` key.
fn resolve_path(flag: Option<&Path>, config: &dyn ConfigPort, key: &str) -> Option<String> {
    flag.map(|p| p.display().to_string()).or_else(|| {
        config
            .get_string("data", key)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

fn run_backtest_command(
    config_path: &Path,
    data: Option<&Path>,
    reference: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), PipsimError> {
    let summary = execute_backtest(config_path, data, reference, output)?;
    println!("{summary}");
    Ok(())
}

/// Full backtest pipeline. Nothing is written unless every input loads
/// and validates.
pub fn execute_backtest(
    config_path: &Path,
    data: Option<&Path>,
    reference: Option<&Path>,
    output: Option<&Path>,
) -> Result<LedgerSummary, PipsimError> {
    let config = load_config(config_path)?;
    let strategy = load_strategy(&config)?;
    info!(strategy = %strategy.name, kind = %strategy.kind, "strategy configured");

    let primary = resolve_path(data, &config, "primary").ok_or_else(|| {
        PipsimError::ConfigMissing {
            section: "data".to_string(),
            key: "primary".to_string(),
        }
    })?;
    let reference = resolve_path(reference, &config, "reference");
    let output = resolve_path(output, &config, "output").unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let adapter = CsvAdapter::new(PathBuf::new());
    let mut market_data = load_market_data(&adapter, &strategy, &primary, reference.as_deref())?;

    let result = run_backtest(&mut market_data, &strategy);
    adapter.write_ledger(&result.ledger, &output)?;
    info!(path = %output, trades = result.ledger.len(), "ledger written");

    let m = &result.metrics;
    info!(
        win_rate = m.win_rate,
        profit_factor = m.profit_factor,
        max_drawdown = m.max_drawdown,
        stop_loss_exits = m.exits.stop_loss,
        take_profit_exits = m.exits.take_profit,
        "run metrics"
    );

    Ok(result.ledger.summary())
}

fn run_validate(config_path: &Path) -> Result<(), PipsimError> {
    let config = load_config(config_path)?;
    let strategy = load_strategy(&config)?;
    println!(
        "config OK: {} ({}), scan {:?}",
        strategy.name, strategy.kind, strategy.risk.scan
    );
    Ok(())
}

fn run_options(data: &Path, strike: f64, option_type: &str, premium: f64) -> Result<(), PipsimError> {
    let option_type: OptionType = option_type.parse()?;
    let adapter = CsvAdapter::new(PathBuf::new());
    let bars = adapter.load_bars(&data.display().to_string())?;
    let total = backtest_option_premium(&bars, strike, option_type, premium)?;
    info!(bars = bars.len(), %option_type, strike, premium, "option premium backtest complete");
    println!("{option_type} strike={strike} premium={premium} total_pl={total:.2}");
    Ok(())
}
