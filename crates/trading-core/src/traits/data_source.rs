//! Market data trait definition.

use crate::error::DataError;
use crate::types::{Bar, Timeframe};
use async_trait::async_trait;

/// Trait for market snapshot adapters.
///
/// Implementations are pure queries from the strategy's point of view.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetch the most recent bars for an instrument.
    ///
    /// # Arguments
    /// * `instrument` - The instrument to fetch
    /// * `timeframe` - Bar granularity
    /// * `count` - Maximum number of bars to return
    /// * `cut_yesterday` - Drop bars from a previous session when the
    ///   result spans two sessions
    ///
    /// # Returns
    /// Up to `count` bars. Adapters may return them newest first, and may
    /// return fewer than `count` near session start.
    async fn get_candles(
        &self,
        instrument: &str,
        timeframe: Timeframe,
        count: usize,
        cut_yesterday: bool,
    ) -> Result<Vec<Bar>, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}
