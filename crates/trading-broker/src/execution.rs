//! Order execution engine: place, wait, cancel, reprice.

use chrono::{Local, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use trading_core::error::{StrategyError, TradingResult};
use trading_core::traits::Broker;
use trading_core::types::{OrderRecord, OrderRequest, Side};
use trading_monitor::{OrderLog, OrderLogEntry};

/// Retry settings for the execution engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Placement attempts per logical order
    pub max_retry: u32,
    /// Seconds to wait between placing and cancelling an attempt
    pub wait_time_secs: u64,
    /// Ask the broker whether an attempt filled before cancelling it, and
    /// stop once it has. Off by default: every attempt is cancelled
    /// unconditionally and the loop always runs to `max_retry`.
    pub confirm_fills: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_retry: 3,
            wait_time_secs: 30,
            confirm_fills: false,
        }
    }
}

impl ExecutionConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.max_retry == 0 {
            return Err(StrategyError::InvalidConfig(
                "max_retry must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn wait_time(&self) -> Duration {
        Duration::from_secs(self.wait_time_secs)
    }
}

/// Best-effort "fire, wait, chase" order submission.
///
/// Each attempt is placed, logged, left working for the wait time, then
/// cancelled; the next attempt is repriced one tick toward the market.
/// Nothing is reported about fills: callers must not assume the position
/// changed when `execute` returns.
pub struct OrderExecutor {
    broker: Arc<dyn Broker>,
    order_log: Arc<OrderLog>,
    config: ExecutionConfig,
    price_tick: Decimal,
}

impl OrderExecutor {
    /// Create a new executor.
    pub fn new(
        broker: Arc<dyn Broker>,
        order_log: Arc<OrderLog>,
        config: ExecutionConfig,
        price_tick: Decimal,
    ) -> Self {
        Self {
            broker,
            order_log,
            config,
            price_tick,
        }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Price for the attempt after one at `price`.
    pub fn next_price(&self, price: Decimal, side: Side) -> Decimal {
        match side {
            Side::Buy => price + self.price_tick,
            Side::Sell => price - self.price_tick,
        }
    }

    /// Run the retry sequence for `template`.
    ///
    /// Blocks the caller for `wait_time` per attempt. Broker and log
    /// failures abort the sequence and propagate.
    pub async fn execute(&self, template: &OrderRequest) -> TradingResult<Vec<OrderRecord>> {
        let mut records = Vec::with_capacity(self.config.max_retry as usize);
        let mut price = template.price;

        for attempt in 1..=self.config.max_retry {
            let request = template.with_price(price);
            let order_id = self.broker.place_order(&request).await?;
            let placed_at = Utc::now();

            self.order_log
                .append(&OrderLogEntry::for_request(Local::now().naive_local(), &request))?;

            info!(
                instrument = %request.instrument,
                order_id = %order_id,
                attempt,
                side = %request.side,
                price = %request.price,
                volume = request.volume,
                "order placed"
            );

            records.push(OrderRecord {
                order_id: order_id.clone(),
                action: request.action(),
                request,
                attempt,
                placed_at,
            });

            tokio::time::sleep(self.config.wait_time()).await;

            if self.config.confirm_fills && self.broker.is_filled(&order_id).await? {
                info!(order_id = %order_id, attempt, "order filled");
                break;
            }

            self.broker.cancel_order(&order_id).await?;
            debug!(order_id = %order_id, attempt, "order cancelled");

            if attempt < self.config.max_retry {
                price = self.next_price(price, template.side);
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BrokerEvent, PaperBroker};
    use rust_decimal_macros::dec;
    use trading_core::error::{BrokerError, TradingError};
    use trading_core::types::{Offset, OrderAction};

    fn fast_config(max_retry: u32) -> ExecutionConfig {
        ExecutionConfig {
            max_retry,
            wait_time_secs: 0,
            confirm_fills: false,
        }
    }

    fn executor(
        broker: Arc<PaperBroker>,
        config: ExecutionConfig,
        dir: &tempfile::TempDir,
    ) -> (OrderExecutor, Arc<OrderLog>) {
        let log = Arc::new(OrderLog::open(dir.path().join("order_book.txt")).unwrap());
        let executor = OrderExecutor::new(broker, Arc::clone(&log), config, dec!(1));
        (executor, log)
    }

    #[tokio::test]
    async fn test_unfilled_buy_chases_up_two_ticks() {
        let dir = tempfile::tempdir().unwrap();
        let broker = Arc::new(PaperBroker::new());
        let (executor, log) = executor(Arc::clone(&broker), fast_config(3), &dir);

        let template =
            OrderRequest::limit("rb2510", "SHFE", Side::Buy, Offset::Open, dec!(3500), 2);
        let records = executor.execute(&template).await.unwrap();

        assert_eq!(records.len(), 3);
        let prices: Vec<Decimal> = broker.placements().iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![dec!(3500), dec!(3501), dec!(3502)]);
        assert_eq!(broker.cancellations(), 3);
        assert!(records.iter().all(|r| r.action == OrderAction::BuyOpen));
        assert_eq!(records[2].attempt, 3);

        let lines = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(lines.lines().count(), 3);
        assert!(lines.lines().last().unwrap().ends_with("rb2510，buy-open，3502"));
    }

    #[tokio::test]
    async fn test_unfilled_sell_chases_down() {
        let dir = tempfile::tempdir().unwrap();
        let broker = Arc::new(PaperBroker::new());
        let (executor, _log) = executor(Arc::clone(&broker), fast_config(3), &dir);

        let template =
            OrderRequest::limit("rb2510", "SHFE", Side::Sell, Offset::CloseToday, dec!(3500), 1);
        executor.execute(&template).await.unwrap();

        let placements = broker.placements();
        let prices: Vec<Decimal> = placements.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![dec!(3500), dec!(3499), dec!(3498)]);
        // Only the price moves between attempts
        assert!(placements
            .iter()
            .all(|r| r.volume == 1 && r.offset == Offset::CloseToday && r.side == Side::Sell));
    }

    #[tokio::test]
    async fn test_each_attempt_cancelled_before_next_placement() {
        let dir = tempfile::tempdir().unwrap();
        let broker = Arc::new(PaperBroker::new());
        let (executor, _log) = executor(Arc::clone(&broker), fast_config(2), &dir);

        let template =
            OrderRequest::limit("rb2510", "SHFE", Side::Buy, Offset::Open, dec!(3500), 1);
        let records = executor.execute(&template).await.unwrap();

        let events = broker.events();
        assert_eq!(events.len(), 4);
        assert!(
            matches!(&events[0], BrokerEvent::Placed { order_id, .. } if *order_id == records[0].order_id)
        );
        assert!(
            matches!(&events[1], BrokerEvent::Cancelled { order_id } if *order_id == records[0].order_id)
        );
        assert!(matches!(&events[2], BrokerEvent::Placed { .. }));
        assert!(matches!(&events[3], BrokerEvent::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_fills_are_not_checked_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let broker = Arc::new(PaperBroker::new());
        broker.set_mark("rb2510", dec!(3500));
        let (executor, _log) = executor(Arc::clone(&broker), fast_config(3), &dir);

        let template =
            OrderRequest::limit("rb2510", "SHFE", Side::Buy, Offset::Open, dec!(3503), 1);
        let records = executor.execute(&template).await.unwrap();

        // Every attempt is placed and cancelled even though the first filled
        assert_eq!(records.len(), 3);
        assert_eq!(broker.cancellations(), 3);
    }

    #[tokio::test]
    async fn test_confirm_fills_stops_after_fill() {
        let dir = tempfile::tempdir().unwrap();
        let broker = Arc::new(PaperBroker::new());
        broker.set_mark("rb2510", dec!(3501));
        let config = ExecutionConfig {
            confirm_fills: true,
            ..fast_config(3)
        };
        let (executor, _log) = executor(Arc::clone(&broker), config, &dir);

        // First attempt at 3500 rests, second at 3501 crosses the mark
        let template =
            OrderRequest::limit("rb2510", "SHFE", Side::Buy, Offset::Open, dec!(3500), 1);
        let records = executor.execute(&template).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(broker.cancellations(), 1);
        assert_eq!(broker.get_position("rb2510").await.unwrap().long_today, 1);
    }

    #[tokio::test]
    async fn test_broker_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let broker = Arc::new(PaperBroker::new());
        broker.disconnect();
        let (executor, log) = executor(Arc::clone(&broker), fast_config(3), &dir);

        let template =
            OrderRequest::limit("rb2510", "SHFE", Side::Buy, Offset::Open, dec!(3500), 1);
        let err = executor.execute(&template).await.unwrap_err();

        assert!(matches!(err, TradingError::Broker(BrokerError::Connection(_))));
        assert_eq!(std::fs::read_to_string(log.path()).unwrap(), "");
    }

    #[test]
    fn test_zero_retries_rejected() {
        assert!(fast_config(0).validate().is_err());
        assert!(ExecutionConfig::default().validate().is_ok());
        assert_eq!(ExecutionConfig::default().wait_time(), Duration::from_secs(30));
    }
}
