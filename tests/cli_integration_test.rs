//! CLI integration tests with real INI and CSV files on disk.
//!
//! Tests cover:
//! - Full backtest writes a ledger with the expected header and rows
//! - Command-line paths override the `[data]` section
//! - Fatal input and config errors write no ledger
//! - `validate` and `options` subcommands

mod common;

use clap::Parser;
use common::*;
use pipsim::adapters::csv_adapter::LEDGER_HEADER;
use pipsim::cli::{self, Cli};
use pipsim::domain::error::PipsimError;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;

fn write_csv(dir: &Path, name: &str, bars: &[Bar]) -> PathBuf {
    let mut content = String::from("Datetime,Open,High,Low,Close\n");
    for bar in bars {
        writeln!(
            content,
            "{},{},{},{},{}",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close
        )
        .unwrap();
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn write_ini(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("run.ini");
    fs::write(&path, content).unwrap();
    path
}

fn mean_reversion_ini(primary: &Path, output: &Path) -> String {
    format!(
        r#"
[strategy]
name = EURUSD mean reversion
kind = mean_reversion
sma_period = 50
rsi_period = 14

[risk]
stop_basis = fixed_pips
stop_loss_pips = 10
take_profit_pips = 20

[instrument]
pip_size = 0.0001
pip_value = 10

[account]
initial_balance = 10000

[data]
primary = {}
output = {}
"#,
        primary.display(),
        output.display()
    )
}

fn declining_bars() -> Vec<Bar> {
    bars_from_closes(&legs(1.1000, &[(70, -0.0005)]))
}

mod backtest_command {
    use super::*;

    #[test]
    fn writes_ledger_and_returns_summary() {
        let dir = TempDir::new().unwrap();
        let primary = write_csv(dir.path(), "EURUSD.csv", &declining_bars());
        let output = dir.path().join("ledger.csv");
        let config = write_ini(dir.path(), &mean_reversion_ini(&primary, &output));

        let summary = cli::execute_backtest(&config, None, None, None).unwrap();
        assert!(summary.total_trades > 0);

        let content = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], LEDGER_HEADER.join(","));
        assert_eq!(lines.len(), summary.total_trades + 1);
        assert!(lines[1].starts_with("Long,2024-03-06 01:00:00,"));
        assert!(lines[1].contains(",StopLoss,"));
    }

    #[test]
    fn command_line_paths_override_config() {
        let dir = TempDir::new().unwrap();
        let primary = write_csv(dir.path(), "EURUSD.csv", &declining_bars());
        let config_output = dir.path().join("from_config.csv");
        let flag_output = dir.path().join("from_flag.csv");
        let config = write_ini(
            dir.path(),
            &mean_reversion_ini(Path::new("missing.csv"), &config_output),
        );

        cli::execute_backtest(&config, Some(&primary), None, Some(&flag_output)).unwrap();
        assert!(flag_output.exists());
        assert!(!config_output.exists());
    }

    #[test]
    fn run_returns_success() {
        let dir = TempDir::new().unwrap();
        let primary = write_csv(dir.path(), "EURUSD.csv", &declining_bars());
        let output = dir.path().join("ledger.csv");
        let config = write_ini(dir.path(), &mean_reversion_ini(&primary, &output));

        let cli = Cli::try_parse_from([
            "pipsim",
            "backtest",
            "--config",
            config.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(cli::run(cli), ExitCode::SUCCESS);
        assert!(output.exists());
    }
}

mod fatal_errors {
    use super::*;

    #[test]
    fn non_monotonic_timestamps_write_nothing() {
        let dir = TempDir::new().unwrap();
        let mut bars = declining_bars();
        bars.swap(10, 11);
        bars[11].timestamp = bars[10].timestamp;
        let primary = write_csv(dir.path(), "EURUSD.csv", &bars);
        let output = dir.path().join("ledger.csv");
        let config = write_ini(dir.path(), &mean_reversion_ini(&primary, &output));

        let err = cli::execute_backtest(&config, None, None, None).unwrap_err();
        assert!(matches!(err, PipsimError::NonMonotonicTimestamps { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn missing_data_file_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("ledger.csv");
        let config = write_ini(
            dir.path(),
            &mean_reversion_ini(&dir.path().join("nope.csv"), &output),
        );

        let err = cli::execute_backtest(&config, None, None, None).unwrap_err();
        assert!(matches!(err, PipsimError::Io(_)));
        assert!(!output.exists());
    }

    #[test]
    fn invalid_config_fails_before_loading_data() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("ledger.csv");
        let config = write_ini(
            dir.path(),
            "[strategy]\nkind = mean_reversion\noversold = 80\noverbought = 20\n",
        );

        let err = cli::execute_backtest(&config, None, None, Some(&output)).unwrap_err();
        assert!(matches!(err, PipsimError::ConfigInvalid { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn missing_primary_path_is_config_error() {
        let dir = TempDir::new().unwrap();
        let config = write_ini(dir.path(), "[strategy]\nkind = sma_trend\n");
        let err = cli::execute_backtest(&config, None, None, None).unwrap_err();
        assert!(matches!(err, PipsimError::ConfigMissing { key, .. } if key == "primary"));
    }

    #[test]
    fn run_maps_config_errors_to_exit_code_two() {
        let dir = TempDir::new().unwrap();
        let config = write_ini(dir.path(), "[strategy]\nkind = astrology\n");
        let cli = Cli::try_parse_from([
            "pipsim",
            "backtest",
            "--config",
            config.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(cli::run(cli), ExitCode::from(2));
    }
}

mod other_commands {
    use super::*;

    #[test]
    fn validate_accepts_good_config() {
        let dir = TempDir::new().unwrap();
        let config = write_ini(
            dir.path(),
            "[strategy]\nkind = ema_adx\n\n[risk]\nscan = lookahead\n",
        );
        let cli =
            Cli::try_parse_from(["pipsim", "validate", "-c", config.to_str().unwrap()]).unwrap();
        assert_eq!(cli::run(cli), ExitCode::SUCCESS);
    }

    #[test]
    fn validate_rejects_unknown_scan_mode() {
        let dir = TempDir::new().unwrap();
        let config = write_ini(
            dir.path(),
            "[strategy]\nkind = ema_adx\n\n[risk]\nscan = sideways\n",
        );
        let cli =
            Cli::try_parse_from(["pipsim", "validate", "-c", config.to_str().unwrap()]).unwrap();
        assert_eq!(cli::run(cli), ExitCode::from(2));
    }

    #[test]
    fn options_runs_over_csv() {
        let dir = TempDir::new().unwrap();
        let data = write_csv(dir.path(), "EURUSD.csv", &bars_from_closes(&[1.10, 1.12, 1.08]));
        let cli = Cli::try_parse_from([
            "pipsim",
            "options",
            "--data",
            data.to_str().unwrap(),
            "--strike",
            "1.10",
            "--option-type",
            "call",
            "--premium",
            "0.01",
        ])
        .unwrap();
        assert_eq!(cli::run(cli), ExitCode::SUCCESS);
    }

    #[test]
    fn options_rejects_unknown_type() {
        let dir = TempDir::new().unwrap();
        let data = write_csv(dir.path(), "EURUSD.csv", &bars_from_closes(&[1.10, 1.12]));
        let cli = Cli::try_parse_from([
            "pipsim",
            "options",
            "--data",
            data.to_str().unwrap(),
            "--strike",
            "1.10",
            "--option-type",
            "straddle",
            "--premium",
            "0.01",
        ])
        .unwrap();
        assert_eq!(cli::run(cli), ExitCode::from(2));
    }
}
