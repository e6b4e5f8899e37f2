//! Core types and traits for the turning-point strategy.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries, Timeframe)
//! - Order and position types as the broker reports them
//! - Turning-point signals
//! - Collaborator traits for market data and order routing

pub mod types;
pub mod traits;
pub mod error;

pub use error::{TradingError, TradingResult};
pub use types::*;
pub use traits::*;
