//! Turning-point signal.

use serde::{Deserialize, Serialize};

use super::Side;

/// Outcome of evaluating the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurningPoint {
    /// Price broke the window high on a volume surge
    BreakoutUp,
    /// Price broke the window low on a volume surge
    BreakoutDown,
    #[default]
    None,
}

impl TurningPoint {
    /// Direction of the opening order this signal calls for.
    pub fn entry_side(&self) -> Option<Side> {
        match self {
            TurningPoint::BreakoutUp => Some(Side::Buy),
            TurningPoint::BreakoutDown => Some(Side::Sell),
            TurningPoint::None => None,
        }
    }

    pub fn is_signal(&self) -> bool {
        !matches!(self, TurningPoint::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_side() {
        assert_eq!(TurningPoint::BreakoutUp.entry_side(), Some(Side::Buy));
        assert_eq!(TurningPoint::BreakoutDown.entry_side(), Some(Side::Sell));
        assert_eq!(TurningPoint::None.entry_side(), None);
        assert!(!TurningPoint::default().is_signal());
    }
}
