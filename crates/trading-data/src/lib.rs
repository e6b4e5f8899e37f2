//! Data sources for the strategy.

mod csv_source;
mod replay;

pub use csv_source::CsvDataSource;
pub use replay::ReplayFeed;

use trading_core::error::DataError;
use trading_core::types::Bar;

/// Load bars from a CSV file, oldest first.
pub fn load_csv(path: &str) -> Result<Vec<Bar>, DataError> {
    CsvDataSource::new(path)?.load_all()
}
