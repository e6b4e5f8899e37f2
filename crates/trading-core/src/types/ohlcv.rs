//! OHLCV (Open, High, Low, Close, Volume) data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Timeframe;

/// OHLCV bar. Immutable once retrieved from the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Get the timestamp as a wall-clock instant, if it is representable.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Elapsed minutes from `earlier` to `later` (both Unix milliseconds).
///
/// Returns `None` when either timestamp has no wall-clock meaning.
pub fn minutes_between(earlier: i64, later: i64) -> Option<f64> {
    let from = DateTime::from_timestamp_millis(earlier)?;
    let to = DateTime::from_timestamp_millis(later)?;
    Some((to - from).num_milliseconds() as f64 / 60_000.0)
}

/// A market snapshot ordered oldest to newest.
#[derive(Debug, Clone)]
pub struct BarSeries {
    /// Instrument identifier
    pub symbol: String,
    /// Timeframe of the bars
    pub timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series from adapter output, whatever its orientation.
    ///
    /// Bars are sorted by timestamp so index 0 is the oldest bar.
    pub fn from_snapshot(symbol: impl Into<String>, timeframe: Timeframe, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        Self {
            symbol: symbol.into(),
            timeframe,
            bars,
        }
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get all bars, oldest first.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Get the newest bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Bars within `half_width` positions of the newest bar.
    ///
    /// The newest bar has no successors, so this is the trailing
    /// `half_width + 1` bars (fewer at data start).
    pub fn centered_window(&self, half_width: usize) -> &[Bar] {
        if self.bars.is_empty() {
            return &[];
        }
        let latest = self.bars.len() - 1;
        let start = latest.saturating_sub(half_width);
        let end = (latest + half_width + 1).min(self.bars.len());
        &self.bars[start..end]
    }
}
