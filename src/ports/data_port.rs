//! Data access port trait.

use crate::domain::error::PipsimError;
use crate::domain::ohlcv::Bar;

pub trait DataPort {
    /// Loads one OHLC series, sorted ascending by timestamp.
    ///
    /// `source` is adapter specific (a file path for [`CsvAdapter`]).
    ///
    /// [`CsvAdapter`]: crate::adapters::csv_adapter::CsvAdapter
    fn load_bars(&self, source: &str) -> Result<Vec<Bar>, PipsimError>;
}
