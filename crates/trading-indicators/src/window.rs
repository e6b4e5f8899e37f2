//! Breakout window statistics.

use serde::{Deserialize, Serialize};
use trading_core::types::Bar;

use crate::simd::{mean_simd, minmax_simd};

/// Extremes and mean volume over a window of bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Highest high in the window
    pub high: f64,
    /// Lowest low in the window
    pub low: f64,
    /// Mean volume across the window
    pub volume_mean: f64,
    /// Number of bars the statistics cover
    pub len: usize,
}

impl WindowStats {
    /// Compute statistics for a window. `None` for an empty window.
    pub fn from_bars(window: &[Bar]) -> Option<Self> {
        let highs: Vec<f64> = window.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = window.iter().map(|b| b.low).collect();
        let volumes: Vec<f64> = window.iter().map(|b| b.volume).collect();

        let (_, high) = minmax_simd(&highs)?;
        let (low, _) = minmax_simd(&lows)?;
        let volume_mean = mean_simd(&volumes)?;

        Some(Self {
            high,
            low,
            volume_mean,
            len: window.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_stats() {
        let bars = vec![
            Bar::new(1, 100.0, 102.0, 99.0, 101.0, 100.0),
            Bar::new(2, 101.0, 105.0, 100.0, 104.0, 200.0),
            Bar::new(3, 104.0, 104.5, 97.5, 98.0, 300.0),
        ];
        let stats = WindowStats::from_bars(&bars).unwrap();

        assert_eq!(stats.high, 105.0);
        assert_eq!(stats.low, 97.5);
        assert!((stats.volume_mean - 200.0).abs() < 1e-10);
        assert_eq!(stats.len, 3);
    }

    #[test]
    fn test_empty_window() {
        assert!(WindowStats::from_bars(&[]).is_none());
    }

    #[test]
    fn test_zero_volume_window() {
        let bars = vec![Bar::new(1, 1.0, 1.0, 1.0, 1.0, 0.0)];
        let stats = WindowStats::from_bars(&bars).unwrap();
        assert_eq!(stats.volume_mean, 0.0);
    }
}
