//! Paper trading broker for simulation and tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use trading_core::error::BrokerError;
use trading_core::traits::Broker;
use trading_core::types::{Offset, OrderRequest, PositionSnapshot, Side};
use uuid::Uuid;

/// Every call the paper broker receives, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerEvent {
    Relog,
    Placed {
        order_id: String,
        request: OrderRequest,
    },
    Cancelled {
        order_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaperStatus {
    Working,
    Filled,
    Cancelled,
}

#[derive(Default)]
struct PaperState {
    positions: HashMap<String, PositionSnapshot>,
    marks: HashMap<String, Decimal>,
    orders: HashMap<String, PaperStatus>,
    events: Vec<BrokerEvent>,
    disconnected: bool,
}

/// Paper broker.
///
/// A limit order fills in full at placement when a mark price is set for its
/// instrument and the limit crosses it; otherwise it rests until cancelled.
/// Without marks nothing ever fills.
#[derive(Default)]
pub struct PaperBroker {
    state: Mutex<PaperState>,
}

impl PaperBroker {
    /// Create a new, flat paper broker.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, PaperState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a position, e.g. one opened before the strategy started.
    pub fn set_position(&self, instrument: &str, position: PositionSnapshot) {
        self.state().positions.insert(instrument.to_string(), position);
    }

    /// Set the price marketable orders fill against.
    pub fn set_mark(&self, instrument: &str, price: Decimal) {
        self.state().marks.insert(instrument.to_string(), price);
    }

    /// Make every subsequent call fail with a connection error.
    pub fn disconnect(&self) {
        self.state().disconnected = true;
    }

    /// Calls received so far.
    pub fn events(&self) -> Vec<BrokerEvent> {
        self.state().events.clone()
    }

    /// Requests placed so far, in order.
    pub fn placements(&self) -> Vec<OrderRequest> {
        self.state()
            .events
            .iter()
            .filter_map(|event| match event {
                BrokerEvent::Placed { request, .. } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of cancellations received so far.
    pub fn cancellations(&self) -> usize {
        self.state()
            .events
            .iter()
            .filter(|event| matches!(event, BrokerEvent::Cancelled { .. }))
            .count()
    }

    fn ensure_connected(state: &PaperState) -> Result<(), BrokerError> {
        if state.disconnected {
            return Err(BrokerError::Connection("paper broker disconnected".to_string()));
        }
        Ok(())
    }
}

fn is_marketable(request: &OrderRequest, mark: Decimal) -> bool {
    match request.side {
        Side::Buy => request.price >= mark,
        Side::Sell => request.price <= mark,
    }
}

/// Take up to `lots` from today's lots first, then carried ones.
fn reduce(today: &mut u32, carried: &mut u32, lots: u32) {
    let from_today = lots.min(*today);
    *today -= from_today;
    *carried -= (lots - from_today).min(*carried);
}

fn apply_fill(position: &mut PositionSnapshot, request: &OrderRequest) {
    let lots = request.volume;
    match (request.side, request.offset) {
        (Side::Buy, Offset::Open) => position.long_today += lots,
        (Side::Sell, Offset::Open) => position.short_today += lots,
        (Side::Buy, _) => reduce(&mut position.short_today, &mut position.short_carried, lots),
        (Side::Sell, _) => reduce(&mut position.long_today, &mut position.long_carried, lots),
    }
}

#[async_trait]
impl Broker for PaperBroker {
    async fn get_position(&self, instrument: &str) -> Result<PositionSnapshot, BrokerError> {
        let state = self.state();
        Self::ensure_connected(&state)?;
        Ok(state.positions.get(instrument).copied().unwrap_or_default())
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<String, BrokerError> {
        let mut state = self.state();
        Self::ensure_connected(&state)?;

        if request.volume == 0 {
            return Err(BrokerError::OrderRejected("zero volume".to_string()));
        }

        let order_id = Uuid::new_v4().to_string();
        let fills = state
            .marks
            .get(&request.instrument)
            .is_some_and(|mark| is_marketable(request, *mark));

        let status = if fills {
            let position = state
                .positions
                .entry(request.instrument.clone())
                .or_default();
            apply_fill(position, request);
            PaperStatus::Filled
        } else {
            PaperStatus::Working
        };

        state.orders.insert(order_id.clone(), status);
        state.events.push(BrokerEvent::Placed {
            order_id: order_id.clone(),
            request: request.clone(),
        });

        Ok(order_id)
    }

    async fn cancel_order(&self, order_id: &str) -> Result<(), BrokerError> {
        let mut state = self.state();
        Self::ensure_connected(&state)?;

        let status = state
            .orders
            .get_mut(order_id)
            .ok_or_else(|| BrokerError::OrderNotFound(order_id.to_string()))?;
        if *status == PaperStatus::Working {
            *status = PaperStatus::Cancelled;
        }

        state.events.push(BrokerEvent::Cancelled {
            order_id: order_id.to_string(),
        });
        Ok(())
    }

    async fn is_filled(&self, order_id: &str) -> Result<bool, BrokerError> {
        let state = self.state();
        Self::ensure_connected(&state)?;
        state
            .orders
            .get(order_id)
            .map(|status| *status == PaperStatus::Filled)
            .ok_or_else(|| BrokerError::OrderNotFound(order_id.to_string()))
    }

    async fn relog(&self) -> Result<(), BrokerError> {
        let mut state = self.state();
        Self::ensure_connected(&state)?;
        state.events.push(BrokerEvent::Relog);
        Ok(())
    }

    fn name(&self) -> &str {
        "Paper Broker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_unmarked_order_rests_and_cancels() {
        let broker = PaperBroker::new();
        let request = OrderRequest::limit("rb2510", "SHFE", Side::Buy, Offset::Open, dec!(3500), 1);

        let id = broker.place_order(&request).await.unwrap();
        assert!(!broker.is_filled(&id).await.unwrap());

        broker.cancel_order(&id).await.unwrap();
        // Cancelling twice is not an error
        broker.cancel_order(&id).await.unwrap();
        assert_eq!(broker.cancellations(), 2);
        assert!(broker.get_position("rb2510").await.unwrap().is_flat());
    }

    #[tokio::test]
    async fn test_marketable_order_fills() {
        let broker = PaperBroker::new();
        broker.set_mark("rb2510", dec!(3500));

        let buy = OrderRequest::limit("rb2510", "SHFE", Side::Buy, Offset::Open, dec!(3503), 2);
        let id = broker.place_order(&buy).await.unwrap();
        assert!(broker.is_filled(&id).await.unwrap());
        assert_eq!(broker.get_position("rb2510").await.unwrap().long_today, 2);

        // A sell limit above the mark does not fill
        let sell =
            OrderRequest::limit("rb2510", "SHFE", Side::Sell, Offset::CloseToday, dec!(3510), 2);
        let id = broker.place_order(&sell).await.unwrap();
        assert!(!broker.is_filled(&id).await.unwrap());
        assert_eq!(broker.get_position("rb2510").await.unwrap().long(), 2);
    }

    #[tokio::test]
    async fn test_close_takes_today_lots_first() {
        let broker = PaperBroker::new();
        broker.set_position(
            "rb2510",
            PositionSnapshot {
                short_today: 1,
                short_carried: 2,
                ..Default::default()
            },
        );
        broker.set_mark("rb2510", dec!(3500));

        let close =
            OrderRequest::limit("rb2510", "SHFE", Side::Buy, Offset::CloseToday, dec!(3503), 2);
        broker.place_order(&close).await.unwrap();

        let position = broker.get_position("rb2510").await.unwrap();
        assert_eq!(position.short_today, 0);
        assert_eq!(position.short_carried, 1);
    }

    #[tokio::test]
    async fn test_disconnected_broker_fails() {
        let broker = PaperBroker::new();
        broker.disconnect();

        let err = broker.relog().await.unwrap_err();
        assert!(matches!(err, BrokerError::Connection(_)));
        assert!(broker.get_position("rb2510").await.is_err());
    }

    #[tokio::test]
    async fn test_cancel_unknown_order() {
        let broker = PaperBroker::new();
        let err = broker.cancel_order("missing").await.unwrap_err();
        assert!(matches!(err, BrokerError::OrderNotFound(_)));
    }
}
