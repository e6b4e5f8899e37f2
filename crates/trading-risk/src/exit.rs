//! Closing-order decisions.

use serde::{Deserialize, Serialize};
use std::fmt;
use trading_core::types::{Offset, Side};

/// Why a position is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    TakeProfit,
    StopLoss,
    /// A new signal opposes the held side
    Reversal,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::TakeProfit => write!(f, "take-profit"),
            CloseReason::StopLoss => write!(f, "stop-loss"),
            CloseReason::Reversal => write!(f, "reversal"),
        }
    }
}

/// A closing order to submit for the full quantity of one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosePlan {
    /// Direction of the closing order (sell closes a long)
    pub side: Side,
    /// Lots to close
    pub quantity: u32,
    /// Closing offset
    pub offset: Offset,
    pub reason: CloseReason,
}

impl ClosePlan {
    /// Close the whole long side.
    pub fn close_long(quantity: u32, reason: CloseReason) -> Self {
        Self {
            side: Side::Sell,
            quantity,
            offset: Offset::CloseToday,
            reason,
        }
    }

    /// Close the whole short side.
    pub fn close_short(quantity: u32, reason: CloseReason) -> Self {
        Self {
            side: Side::Buy,
            quantity,
            offset: Offset::CloseToday,
            reason,
        }
    }

    /// Whether this plan closes long lots.
    pub fn closes_long(&self) -> bool {
        self.side == Side::Sell
    }
}
