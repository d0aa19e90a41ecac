//! CSV file adapter: OHLC input and ledger export.

use crate::domain::error::PipsimError;
use crate::domain::ledger::Ledger;
use crate::domain::ohlcv::{validate_series, Bar};
use crate::ports::data_port::DataPort;
use crate::ports::ledger_port::LedgerPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs::File;
use std::path::PathBuf;

const TIMESTAMP_HEADERS: [&str; 2] = ["date", "datetime"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y.%m.%d %H:%M"];

pub const LEDGER_HEADER: [&str; 12] = [
    "trade_type",
    "entry_time",
    "entry_price",
    "stop_loss",
    "take_profit",
    "exit_time",
    "exit_price",
    "exit_reason",
    "pips",
    "profit_loss",
    "size",
    "balance",
];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    /// Relative sources and destinations resolve against `base_path`.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }
}

struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, PipsimError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let price = |name: &str| {
            find(name).ok_or_else(|| PipsimError::input(format!("missing {} column", name)))
        };

        let timestamp = headers
            .iter()
            .position(|h| {
                TIMESTAMP_HEADERS
                    .iter()
                    .any(|t| h.trim().eq_ignore_ascii_case(t))
            })
            .ok_or_else(|| PipsimError::input("missing timestamp column (Date or Datetime)"))?;

        Ok(Columns {
            timestamp,
            open: price("Open")?,
            high: price("High")?,
            low: price("Low")?,
            close: price("Close")?,
        })
    }
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_price(
    record: &csv::StringRecord,
    index: usize,
    field: &str,
    row: usize,
) -> Result<f64, PipsimError> {
    let raw = record
        .get(index)
        .ok_or_else(|| PipsimError::input(format!("missing {} value at row {}", field, row)))?;
    raw.trim().parse::<f64>().map_err(|_| {
        PipsimError::input(format!("invalid {} value '{}' at row {}", field, raw, row))
    })
}

impl DataPort for CsvAdapter {
    fn load_bars(&self, source: &str) -> Result<Vec<Bar>, PipsimError> {
        let path = self.resolve(source);
        let file = File::open(&path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers = rdr.headers()?;
        if headers.is_empty() {
            return Err(PipsimError::EmptySeries {
                series: source.to_string(),
            });
        }
        let columns = Columns::locate(headers)?;
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result?;
            let raw_ts = record.get(columns.timestamp).unwrap_or_default();
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
                PipsimError::input(format!("invalid timestamp '{}' at row {}", raw_ts, row))
            })?;

            bars.push(Bar {
                timestamp,
                open: parse_price(&record, columns.open, "open", row)?,
                high: parse_price(&record, columns.high, "high", row)?,
                low: parse_price(&record, columns.low, "low", row)?,
                close: parse_price(&record, columns.close, "close", row)?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        validate_series(source, &bars)?;
        Ok(bars)
    }
}

impl LedgerPort for CsvAdapter {
    fn write_ledger(&self, ledger: &Ledger, destination: &str) -> Result<(), PipsimError> {
        let file = File::create(self.resolve(destination))?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        wtr.write_record(LEDGER_HEADER)?;
        for row in ledger.rows() {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
