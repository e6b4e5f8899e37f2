//! Risk management for the turning-point strategy.
//!
//! Provides position sizing, take-profit/stop-loss exits and reversal
//! closes. Everything here is a pure decision; order submission happens
//! in the strategy.

mod exit;
mod position_sizer;
mod reversal;
mod stop_loss;

pub use exit::{ClosePlan, CloseReason};
pub use position_sizer::{PositionSizer, MAX_LOTS, MIN_LOTS};
pub use reversal::ReversalHandler;
pub use stop_loss::RiskMonitor;
