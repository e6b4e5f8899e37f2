//! Bar-by-bar replay of recorded data.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use trading_core::error::DataError;
use trading_core::traits::MarketData;
use trading_core::types::{Bar, Timeframe};

/// Market data adapter that reveals one recorded bar per `advance` call.
///
/// Like a live adapter, `get_candles` answers newest first.
pub struct ReplayFeed {
    bars: Vec<Bar>,
    visible: AtomicUsize,
}

impl ReplayFeed {
    /// Create a feed with no bars visible yet.
    pub fn new(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        Self {
            bars,
            visible: AtomicUsize::new(0),
        }
    }

    /// Reveal the next bar. Returns it, or `None` once the data is exhausted.
    pub fn advance(&self) -> Option<Bar> {
        let len = self.bars.len();
        self.visible
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |visible| {
                (visible < len).then_some(visible + 1)
            })
            .ok()
            .and_then(|revealed| self.bars.get(revealed).copied())
    }
}

/// UTC calendar day of a millisecond timestamp.
fn day_of(timestamp: i64) -> i64 {
    timestamp.div_euclid(86_400_000)
}

#[async_trait]
impl MarketData for ReplayFeed {
    async fn get_candles(
        &self,
        _instrument: &str,
        _timeframe: Timeframe,
        count: usize,
        cut_yesterday: bool,
    ) -> Result<Vec<Bar>, DataError> {
        let visible = self.visible.load(Ordering::Acquire);
        let start = visible.saturating_sub(count);
        let mut candles: Vec<Bar> = self.bars[start..visible].to_vec();

        if cut_yesterday {
            if let Some(newest) = candles.last() {
                let today = day_of(newest.timestamp);
                candles.retain(|b| day_of(b.timestamp) == today);
            }
        }

        candles.reverse();
        Ok(candles)
    }

    fn name(&self) -> &str {
        "Replay"
    }
}
