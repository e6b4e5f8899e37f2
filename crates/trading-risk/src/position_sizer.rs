//! Volume-strength position sizing.

use serde::{Deserialize, Serialize};

/// Smallest order any signal produces.
pub const MIN_LOTS: u32 = 1;
/// Largest order any signal produces, whatever the volume spike.
pub const MAX_LOTS: u32 = 5;

/// Scales a base lot count by how far current volume exceeds the window mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSizer {
    base_volume: u32,
}

impl PositionSizer {
    /// Create a new position sizer.
    pub fn new(base_volume: u32) -> Self {
        Self { base_volume }
    }

    /// Calculate the order quantity.
    ///
    /// `floor(base * current / mean)` clamped to `[MIN_LOTS, MAX_LOTS]`.
    /// A non-positive mean counts as strength 1.
    pub fn calculate(&self, current_volume: f64, window_volume_mean: f64) -> u32 {
        let strength = if window_volume_mean > 0.0 {
            current_volume / window_volume_mean
        } else {
            1.0
        };

        let raw = (self.base_volume as f64 * strength).floor();
        // NaN and negatives fall to the lower bound.
        if raw.is_nan() || raw < MIN_LOTS as f64 {
            return MIN_LOTS;
        }
        if raw >= MAX_LOTS as f64 {
            return MAX_LOTS;
        }
        raw as u32
    }
}
