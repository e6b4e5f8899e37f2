//! Core data types for the trading system.

mod ohlcv;
mod order;
mod position;
mod signal;
mod timeframe;

pub use ohlcv::{minutes_between, Bar, BarSeries};
pub use order::{Offset, OrderAction, OrderRecord, OrderRequest, PriceType, Side};
pub use position::PositionSnapshot;
pub use signal::TurningPoint;
pub use timeframe::Timeframe;
