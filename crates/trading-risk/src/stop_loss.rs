//! Take-profit and stop-loss monitoring.

use serde::{Deserialize, Serialize};
use tracing::debug;
use trading_core::types::PositionSnapshot;

use crate::{ClosePlan, CloseReason};

/// Closes an open position once floating profit or loss crosses a threshold.
///
/// Thresholds are absolute price distances from the recorded entry price.
/// Without a recorded entry price no exit can trigger: a position opened
/// before this process started is invisible to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMonitor {
    take_profit: f64,
    stop_loss: f64,
}

impl RiskMonitor {
    /// Create a new risk monitor.
    pub fn new(take_profit: f64, stop_loss: f64) -> Self {
        Self {
            take_profit,
            stop_loss,
        }
    }

    /// Classify a floating profit against the thresholds.
    pub fn check_profit(&self, profit: f64) -> Option<CloseReason> {
        if profit >= self.take_profit {
            Some(CloseReason::TakeProfit)
        } else if profit <= -self.stop_loss {
            Some(CloseReason::StopLoss)
        } else {
            None
        }
    }

    /// Evaluate both sides of the position against the latest close.
    ///
    /// Returns one closing plan per side that must be exited.
    pub fn evaluate(
        &self,
        position: &PositionSnapshot,
        entry_price: Option<f64>,
        close: f64,
    ) -> Vec<ClosePlan> {
        let mut exits = Vec::new();
        let Some(entry) = entry_price else {
            return exits;
        };

        if position.long() > 0 {
            let profit = close - entry;
            debug!(entry, close, profit, "long floating profit");
            if let Some(reason) = self.check_profit(profit) {
                exits.push(ClosePlan::close_long(position.long(), reason));
            }
        }

        if position.short() > 0 {
            let profit = entry - close;
            debug!(entry, close, profit, "short floating profit");
            if let Some(reason) = self.check_profit(profit) {
                exits.push(ClosePlan::close_short(position.short(), reason));
            }
        }

        exits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trading_core::types::{Offset, Side};

    fn long(lots: u32) -> PositionSnapshot {
        PositionSnapshot {
            long_today: lots,
            ..Default::default()
        }
    }

    fn short(lots: u32) -> PositionSnapshot {
        PositionSnapshot {
            short_carried: lots,
            ..Default::default()
        }
    }

    #[test]
    fn test_long_thresholds() {
        let monitor = RiskMonitor::new(10.0, 5.0);

        let exits = monitor.evaluate(&long(2), Some(100.0), 110.0);
        assert_eq!(exits, vec![ClosePlan::close_long(2, CloseReason::TakeProfit)]);

        let exits = monitor.evaluate(&long(2), Some(100.0), 95.0);
        assert_eq!(exits, vec![ClosePlan::close_long(2, CloseReason::StopLoss)]);

        assert!(monitor.evaluate(&long(2), Some(100.0), 105.0).is_empty());
        assert!(monitor.evaluate(&long(2), Some(100.0), 95.5).is_empty());
    }

    #[test]
    fn test_short_thresholds() {
        let monitor = RiskMonitor::new(10.0, 5.0);

        let exits = monitor.evaluate(&short(3), Some(100.0), 90.0);
        assert_eq!(exits.len(), 1);
        assert_eq!(exits[0].side, Side::Buy);
        assert_eq!(exits[0].quantity, 3);
        assert_eq!(exits[0].offset, Offset::CloseToday);
        assert_eq!(exits[0].reason, CloseReason::TakeProfit);

        let exits = monitor.evaluate(&short(3), Some(100.0), 105.0);
        assert_eq!(exits[0].reason, CloseReason::StopLoss);

        assert!(monitor.evaluate(&short(3), Some(100.0), 97.0).is_empty());
    }

    #[test]
    fn test_no_entry_price_never_exits() {
        let monitor = RiskMonitor::new(10.0, 5.0);
        assert!(monitor.evaluate(&long(1), None, 1_000.0).is_empty());
        assert!(monitor.evaluate(&short(1), None, 1.0).is_empty());
    }

    #[test]
    fn test_flat_position_never_exits() {
        let monitor = RiskMonitor::new(10.0, 5.0);
        let flat = PositionSnapshot::default();
        assert!(monitor.evaluate(&flat, Some(100.0), 200.0).is_empty());
    }
}
