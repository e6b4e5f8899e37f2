//! Turning-point trend-following strategy.
//!
//! [`TurningPointDetector`] classifies the newest bar; [`TrendFollowStrategy`]
//! wires detection, risk management and order execution into one cycle.

mod trend_follow;
mod turning_point;

pub use trend_follow::{TrendFollowConfig, TrendFollowStrategy};
pub use turning_point::{Detection, SkipReason, StrategyState, TurningPointDetector};
