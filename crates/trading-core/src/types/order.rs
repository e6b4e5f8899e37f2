//! Order types and structures.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OrderLogError;

/// Order direction (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Broker direction code.
    pub fn code(&self) -> u8 {
        match self {
            Side::Buy => 2,
            Side::Sell => 3,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Whether an order opens a new position or closes an existing lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Offset {
    Open,
    CloseToday,
    CloseYesterday,
}

impl Offset {
    /// Broker offset code.
    pub fn code(&self) -> u8 {
        match self {
            Offset::Open => 1,
            Offset::CloseToday => 4,
            Offset::CloseYesterday => 5,
        }
    }

    pub fn is_close(&self) -> bool {
        !matches!(self, Offset::Open)
    }
}

/// Order price type. Only limit orders are submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    #[default]
    Limit,
}

impl PriceType {
    /// Broker price type code.
    pub fn code(&self) -> u8 {
        1
    }
}

/// Order request for submitting new orders.
///
/// Built once per logical order; across retries only `price` changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Instrument to trade
    pub instrument: String,
    /// Exchange the instrument is listed on
    pub exchange: String,
    /// Buy or sell
    pub side: Side,
    /// Open or close
    pub offset: Offset,
    /// Limit price
    pub price: Decimal,
    /// Number of lots
    pub volume: u32,
    /// Unused by the broker, always zero
    pub stop_price: Decimal,
    /// Price type
    pub price_type: PriceType,
}

impl OrderRequest {
    /// Create a limit order request.
    pub fn limit(
        instrument: impl Into<String>,
        exchange: impl Into<String>,
        side: Side,
        offset: Offset,
        price: Decimal,
        volume: u32,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            exchange: exchange.into(),
            side,
            offset,
            price,
            volume,
            stop_price: Decimal::ZERO,
            price_type: PriceType::Limit,
        }
    }

    /// Copy of this request at a different price.
    pub fn with_price(&self, price: Decimal) -> Self {
        Self {
            price,
            ..self.clone()
        }
    }

    /// The order-log action this request represents.
    pub fn action(&self) -> OrderAction {
        OrderAction::from_order(self.side, self.offset)
    }
}

/// Order-log action label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderAction {
    BuyOpen,
    BuyClose,
    SellOpen,
    SellClose,
}

impl OrderAction {
    pub fn from_order(side: Side, offset: Offset) -> Self {
        match (side, offset.is_close()) {
            (Side::Buy, false) => OrderAction::BuyOpen,
            (Side::Buy, true) => OrderAction::BuyClose,
            (Side::Sell, false) => OrderAction::SellOpen,
            (Side::Sell, true) => OrderAction::SellClose,
        }
    }

    /// Numeric action code used in the order book.
    pub fn code(&self) -> u8 {
        match self {
            OrderAction::BuyOpen => 1,
            OrderAction::BuyClose => 2,
            OrderAction::SellOpen => 3,
            OrderAction::SellClose => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderAction::BuyOpen => "buy-open",
            OrderAction::BuyClose => "buy-close",
            OrderAction::SellOpen => "sell-open",
            OrderAction::SellClose => "sell-close",
        }
    }
}

impl TryFrom<u8> for OrderAction {
    type Error = OrderLogError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(OrderAction::BuyOpen),
            2 => Ok(OrderAction::BuyClose),
            3 => Ok(OrderAction::SellOpen),
            4 => Ok(OrderAction::SellClose),
            other => Err(OrderLogError::InvalidAction(other.to_string())),
        }
    }
}

impl FromStr for OrderAction {
    type Err = OrderLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy-open" => Ok(OrderAction::BuyOpen),
            "buy-close" => Ok(OrderAction::BuyClose),
            "sell-open" => Ok(OrderAction::SellOpen),
            "sell-close" => Ok(OrderAction::SellClose),
            other => Err(OrderLogError::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One placement attempt, as submitted to the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Identifier returned by the broker
    pub order_id: String,
    /// Request exactly as placed
    pub request: OrderRequest,
    /// 1-based attempt number within the retry sequence
    pub attempt: u32,
    /// Order-log action
    pub action: OrderAction,
    /// When the order was placed
    pub placed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_limit_request_defaults() {
        let request = OrderRequest::limit("rb2510", "SHFE", Side::Buy, Offset::Open, dec!(3512), 2);
        assert_eq!(request.stop_price, Decimal::ZERO);
        assert_eq!(request.price_type, PriceType::Limit);
        assert_eq!(request.action(), OrderAction::BuyOpen);
    }

    #[test]
    fn test_with_price_keeps_other_fields() {
        let request =
            OrderRequest::limit("rb2510", "SHFE", Side::Sell, Offset::CloseToday, dec!(3500), 3);
        let repriced = request.with_price(dec!(3499));
        assert_eq!(repriced.price, dec!(3499));
        assert_eq!(repriced.volume, 3);
        assert_eq!(repriced.offset, Offset::CloseToday);
        assert_eq!(repriced.action(), OrderAction::SellClose);
    }

    #[test]
    fn test_action_codes() {
        for code in 1..=4u8 {
            let action = OrderAction::try_from(code).unwrap();
            assert_eq!(action.code(), code);
            assert_eq!(action.label().parse::<OrderAction>().unwrap(), action);
        }
        assert!(OrderAction::try_from(0).is_err());
        assert!(OrderAction::try_from(5).is_err());
        assert!("buy-hold".parse::<OrderAction>().is_err());
    }

    #[test]
    fn test_broker_codes() {
        assert_eq!(Side::Buy.code(), 2);
        assert_eq!(Side::Sell.code(), 3);
        assert_eq!(Offset::Open.code(), 1);
        assert_eq!(Offset::CloseToday.code(), 4);
        assert_eq!(Offset::CloseYesterday.code(), 5);
        assert!(Offset::CloseYesterday.is_close());
    }
}
