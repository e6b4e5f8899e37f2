//! Position snapshot as reported by the broker.

use serde::{Deserialize, Serialize};

/// Long/short lots for one instrument, split by the session they were opened in.
///
/// Queried fresh every cycle; the strategy never maintains its own ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub long_today: u32,
    pub long_carried: u32,
    pub short_today: u32,
    pub short_carried: u32,
}

impl PositionSnapshot {
    /// Total long lots.
    pub fn long(&self) -> u32 {
        self.long_today + self.long_carried
    }

    /// Total short lots.
    pub fn short(&self) -> u32 {
        self.short_today + self.short_carried
    }

    pub fn is_flat(&self) -> bool {
        self.long() == 0 && self.short() == 0
    }

    /// Same snapshot with every long lot removed.
    pub fn without_long(self) -> Self {
        Self {
            long_today: 0,
            long_carried: 0,
            ..self
        }
    }

    /// Same snapshot with every short lot removed.
    pub fn without_short(self) -> Self {
        Self {
            short_today: 0,
            short_carried: 0,
            ..self
        }
    }
}
