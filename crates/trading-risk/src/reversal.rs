//! Close-before-reverse handling.

use trading_core::types::{PositionSnapshot, TurningPoint};

use crate::{ClosePlan, CloseReason};

/// Decides whether a fresh signal must first flatten the opposite side.
///
/// The close and the subsequent open are independent order sequences: a
/// close that does not fill never blocks the open.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReversalHandler;

impl ReversalHandler {
    pub fn new() -> Self {
        Self
    }

    /// Plan the close that must precede the opening order for `signal`.
    pub fn plan(&self, signal: TurningPoint, position: &PositionSnapshot) -> Option<ClosePlan> {
        match signal {
            TurningPoint::BreakoutUp if position.short() > 0 => {
                Some(ClosePlan::close_short(position.short(), CloseReason::Reversal))
            }
            TurningPoint::BreakoutDown if position.long() > 0 => {
                Some(ClosePlan::close_long(position.long(), CloseReason::Reversal))
            }
            _ => None,
        }
    }
}
