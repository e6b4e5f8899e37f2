//! Turning-point trend following.
//!
//! One instance trades one instrument. Each call to [`TrendFollowStrategy::on_cycle`]
//! fetches a fresh snapshot, runs the risk monitor, and acts on any new
//! breakout: close the opposite side if one is held, then open in the
//! breakout direction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use trading_broker::{ExecutionConfig, OrderExecutor};
use trading_core::error::{StrategyError, TradingResult};
use trading_core::traits::{Broker, MarketData};
use trading_core::types::{
    BarSeries, Offset, OrderRecord, OrderRequest, PositionSnapshot, Side, Timeframe,
};
use trading_monitor::OrderLog;
use trading_risk::{ClosePlan, PositionSizer, ReversalHandler, RiskMonitor};

use crate::turning_point::{StrategyState, TurningPointDetector};

/// Configuration for one instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendFollowConfig {
    /// Instrument to trade
    pub instrument: String,
    /// Exchange the instrument is listed on
    pub exchange: String,
    /// Bar granularity
    pub timeframe: Timeframe,
    /// Bars requested per cycle
    pub candle_count: usize,
    /// Drop bars from previous sessions
    pub cut_yesterday: bool,
    /// Half-width of the breakout window
    pub window_size: usize,
    /// Volume must exceed the window mean by this factor
    pub volume_threshold: f64,
    /// Minutes between signals
    pub min_interval: f64,
    /// Base lots per signal before volume scaling
    pub trade_num: u32,
    /// Distance from the close at which limit orders are priced
    pub trade_offset: f64,
    /// Floating profit that closes a position
    pub take_profit: f64,
    /// Floating loss that closes a position
    pub stop_loss: f64,
    /// Reprice step between order attempts
    pub price_tick: f64,
    /// Process stale snapshots instead of skipping them
    pub backtest_mode: bool,
    /// Age beyond which the newest bar is stale
    pub stale_after_secs: i64,
    /// Pause between a reversal close and the new opening order
    pub settle_delay_ms: u64,
}

impl Default for TrendFollowConfig {
    fn default() -> Self {
        Self {
            instrument: String::new(),
            exchange: String::new(),
            timeframe: Timeframe::Minute1,
            candle_count: 30,
            cut_yesterday: true,
            window_size: 5,
            volume_threshold: 1.5,
            min_interval: 5.0,
            trade_num: 1,
            trade_offset: 3.0,
            take_profit: 10.0,
            stop_loss: 5.0,
            price_tick: 1.0,
            backtest_mode: false,
            stale_after_secs: 3600,
            settle_delay_ms: 1000,
        }
    }
}

impl TrendFollowConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.instrument.trim().is_empty() {
            return Err(StrategyError::InvalidConfig("instrument is required".into()));
        }
        if self.window_size == 0 {
            return Err(StrategyError::InvalidConfig(
                "window_size must be greater than 0".into(),
            ));
        }
        if self.candle_count < 2 * self.window_size {
            return Err(StrategyError::InvalidConfig(format!(
                "candle_count must be at least {} for window_size {}",
                2 * self.window_size,
                self.window_size
            )));
        }
        if self.volume_threshold <= 0.0 {
            return Err(StrategyError::InvalidConfig(
                "volume_threshold must be positive".into(),
            ));
        }
        if self.min_interval < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "min_interval cannot be negative".into(),
            ));
        }
        if self.trade_num == 0 {
            return Err(StrategyError::InvalidConfig(
                "trade_num must be greater than 0".into(),
            ));
        }
        if self.price_tick <= 0.0 {
            return Err(StrategyError::InvalidConfig(
                "price_tick must be positive".into(),
            ));
        }
        if self.trade_offset < 0.0 || self.take_profit <= 0.0 || self.stop_loss <= 0.0 {
            return Err(StrategyError::InvalidConfig(
                "trade_offset, take_profit and stop_loss must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn detector(&self) -> TurningPointDetector {
        TurningPointDetector::new(
            self.window_size,
            self.volume_threshold,
            self.min_interval,
            self.stale_after_secs,
            self.backtest_mode,
        )
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Convert a float price to the decimal the broker receives.
fn to_price(value: f64) -> Result<Decimal, StrategyError> {
    Decimal::try_from(value)
        .map(|price| price.round_dp(8).normalize())
        .map_err(|e| StrategyError::Internal(format!("unrepresentable price {value}: {e}")))
}

/// Turning-point trend-following strategy for a single instrument.
pub struct TrendFollowStrategy {
    config: TrendFollowConfig,
    detector: TurningPointDetector,
    sizer: PositionSizer,
    risk: RiskMonitor,
    reversal: ReversalHandler,
    market_data: Arc<dyn MarketData>,
    broker: Arc<dyn Broker>,
    executor: OrderExecutor,
    state: StrategyState,
}

impl TrendFollowStrategy {
    /// Create a new strategy. Both configurations are validated.
    pub fn new(
        config: TrendFollowConfig,
        market_data: Arc<dyn MarketData>,
        broker: Arc<dyn Broker>,
        order_log: Arc<OrderLog>,
        execution: ExecutionConfig,
    ) -> Result<Self, StrategyError> {
        config.validate()?;
        execution.validate()?;

        let executor = OrderExecutor::new(
            Arc::clone(&broker),
            order_log,
            execution,
            to_price(config.price_tick)?,
        );

        Ok(Self {
            detector: config.detector(),
            sizer: PositionSizer::new(config.trade_num),
            risk: RiskMonitor::new(config.take_profit, config.stop_loss),
            reversal: ReversalHandler::new(),
            market_data,
            broker,
            executor,
            state: StrategyState::default(),
            config,
        })
    }

    pub fn config(&self) -> &TrendFollowConfig {
        &self.config
    }

    pub fn state(&self) -> &StrategyState {
        &self.state
    }

    pub fn instrument(&self) -> &str {
        &self.config.instrument
    }

    /// Run one cycle at wall-clock time `now`.
    ///
    /// Returns every order attempt placed during the cycle. The risk monitor
    /// runs on the newest bar even when detection is skipped for short
    /// history or an already processed bar; only an empty or stale snapshot
    /// skips the whole cycle. Collaborator failures abort the cycle and
    /// propagate.
    pub async fn on_cycle(&mut self, now: DateTime<Utc>) -> TradingResult<Vec<OrderRecord>> {
        let candles = self
            .market_data
            .get_candles(
                &self.config.instrument,
                self.config.timeframe,
                self.config.candle_count,
                self.config.cut_yesterday,
            )
            .await?;
        let series = BarSeries::from_snapshot(&self.config.instrument, self.config.timeframe, candles);

        let detection = match self.detector.detect(&series, &mut self.state, now) {
            Ok(detection) => detection,
            Err(reason) => {
                info!(instrument = %self.config.instrument, %reason, "no detection this cycle");
                return match series.last() {
                    Some(bar) if reason.allows_risk_checks() => {
                        let (_, records) = self.manage_risk(bar.close).await?;
                        Ok(records)
                    }
                    _ => Ok(Vec::new()),
                };
            }
        };
        let bar = detection.bar;

        info!(
            instrument = %self.config.instrument,
            close = bar.close,
            volume = bar.volume,
            window_high = detection.window.high,
            window_low = detection.window.low,
            volume_mean = detection.window.volume_mean,
            signal = ?detection.signal,
            "bar evaluated"
        );

        let (position, mut records) = self.manage_risk(bar.close).await?;

        let Some(side) = detection.signal.entry_side() else {
            return Ok(records);
        };

        if let Some(plan) = self.reversal.plan(detection.signal, &position) {
            records.extend(self.close(&plan, bar.close).await?);
            tokio::time::sleep(self.config.settle_delay()).await;
        }

        self.broker.relog().await?;

        let volume = self.sizer.calculate(bar.volume, detection.window.volume_mean);
        let request = self.request(side, Offset::Open, bar.close, volume)?;
        info!(
            instrument = %self.config.instrument,
            %side,
            volume,
            price = %request.price,
            "opening position"
        );
        records.extend(self.executor.execute(&request).await?);

        self.state.last_signal_time = Some(bar.timestamp);
        self.state.last_entry_price = Some(bar.close);

        Ok(records)
    }

    /// Query the position and close any side past its take-profit or
    /// stop-loss. Returns the position with closed sides removed.
    async fn manage_risk(
        &mut self,
        close: f64,
    ) -> TradingResult<(PositionSnapshot, Vec<OrderRecord>)> {
        let mut position = self.broker.get_position(&self.config.instrument).await?;
        info!(
            instrument = %self.config.instrument,
            long = position.long(),
            short = position.short(),
            "position"
        );

        if !position.is_flat() && self.state.last_entry_price.is_none() {
            warn!(
                instrument = %self.config.instrument,
                "position has no recorded entry price; take-profit and stop-loss are inactive"
            );
        }

        let mut records = Vec::new();
        for plan in self
            .risk
            .evaluate(&position, self.state.last_entry_price, close)
        {
            records.extend(self.close(&plan, close).await?);
            position = if plan.closes_long() {
                position.without_long()
            } else {
                position.without_short()
            };
        }

        Ok((position, records))
    }

    /// Submit a closing sequence and forget the entry price.
    async fn close(&mut self, plan: &ClosePlan, close: f64) -> TradingResult<Vec<OrderRecord>> {
        let request = self.request(plan.side, plan.offset, close, plan.quantity)?;
        info!(
            instrument = %self.config.instrument,
            reason = %plan.reason,
            side = %plan.side,
            quantity = plan.quantity,
            price = %request.price,
            "closing position"
        );

        let records = self.executor.execute(&request).await?;
        self.state.last_entry_price = None;
        debug!(instrument = %self.config.instrument, attempts = records.len(), "close submitted");
        Ok(records)
    }

    /// Limit order priced `trade_offset` through the close.
    fn request(
        &self,
        side: Side,
        offset: Offset,
        close: f64,
        volume: u32,
    ) -> Result<OrderRequest, StrategyError> {
        let price = match side {
            Side::Buy => close + self.config.trade_offset,
            Side::Sell => close - self.config.trade_offset,
        };

        Ok(OrderRequest::limit(
            &self.config.instrument,
            &self.config.exchange,
            side,
            offset,
            to_price(price)?,
            volume,
        ))
    }
}

impl std::fmt::Debug for TrendFollowStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrendFollowStrategy")
            .field("instrument", &self.config.instrument)
            .field("market_data", &self.market_data.name())
            .field("broker", &self.broker.name())
            .field("state", &self.state)
            .finish()
    }
}
