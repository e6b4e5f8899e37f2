//! Turning-point detection.
//!
//! The newest bar is compared against a window of recent bars. A close at
//! (or within 0.1% of) the window high on a volume surge is a breakout up;
//! the mirror image against the window low is a breakout down. A minimum
//! interval between signals suppresses re-triggering on the same move.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use trading_core::types::{minutes_between, Bar, BarSeries, TurningPoint};
use trading_indicators::WindowStats;

/// Tolerance applied to the window extremes.
const BREAKOUT_TOLERANCE: f64 = 0.001;

/// Per-instrument bookkeeping carried between cycles.
///
/// Memory only: a restart starts from scratch, so a signal may re-fire
/// immediately after one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyState {
    /// Timestamp (Unix ms) of the bar the last signal fired on
    pub last_signal_time: Option<i64>,
    /// Timestamp (Unix ms) of the newest bar already processed
    pub last_data_time: Option<i64>,
    /// Close of the bar the current position was entered on
    pub last_entry_price: Option<f64>,
}

/// Why a cycle did not reach detection. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientData { have: usize, need: usize },
    /// The newest bar was processed by an earlier cycle
    DuplicateBar { timestamp: i64 },
    /// The newest bar is older than the freshness threshold
    StaleData { age_secs: i64 },
}

impl SkipReason {
    /// Whether the newest bar is still fit for take-profit and stop-loss
    /// checks. Short history and a repeated bar are; missing or stale data
    /// is not.
    pub fn allows_risk_checks(&self) -> bool {
        matches!(
            self,
            SkipReason::InsufficientData { .. } | SkipReason::DuplicateBar { .. }
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no bars returned"),
            SkipReason::InsufficientData { have, need } => {
                write!(f, "insufficient data ({have} bars, need {need})")
            }
            SkipReason::DuplicateBar { timestamp } => {
                write!(f, "bar {timestamp} already processed")
            }
            SkipReason::StaleData { age_secs } => write!(f, "newest bar is {age_secs}s old"),
        }
    }
}

/// Result of evaluating an accepted snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub signal: TurningPoint,
    /// The newest bar
    pub bar: Bar,
    pub window: WindowStats,
}

/// Breakout detector with data guards and a minimum-interval gate.
#[derive(Debug, Clone)]
pub struct TurningPointDetector {
    window_size: usize,
    volume_threshold: f64,
    min_interval_minutes: f64,
    stale_after_secs: i64,
    backtest_mode: bool,
}

impl TurningPointDetector {
    pub fn new(
        window_size: usize,
        volume_threshold: f64,
        min_interval_minutes: f64,
        stale_after_secs: i64,
        backtest_mode: bool,
    ) -> Self {
        Self {
            window_size,
            volume_threshold,
            min_interval_minutes,
            stale_after_secs,
            backtest_mode,
        }
    }

    /// Bars required before detection runs.
    pub fn required_bars(&self) -> usize {
        2 * self.window_size
    }

    /// Run the data guards, then detect.
    ///
    /// An accepted snapshot records its newest timestamp in
    /// `state.last_data_time`; a skipped one leaves `state` untouched.
    pub fn detect(
        &self,
        series: &BarSeries,
        state: &mut StrategyState,
        now: DateTime<Utc>,
    ) -> Result<Detection, SkipReason> {
        let bar = *self.screen(series, state, now)?;
        state.last_data_time = Some(bar.timestamp);

        let window = WindowStats::from_bars(series.centered_window(self.window_size))
            .ok_or(SkipReason::NoData)?;
        let interval_ok = self.interval_satisfied(state.last_signal_time, bar.timestamp);

        Ok(Detection {
            signal: self.classify(&bar, &window, interval_ok),
            bar,
            window,
        })
    }

    /// Guards in order: no data, insufficient data, duplicate bar, stale bar.
    fn screen<'a>(
        &self,
        series: &'a BarSeries,
        state: &StrategyState,
        now: DateTime<Utc>,
    ) -> Result<&'a Bar, SkipReason> {
        let bar = series.last().ok_or(SkipReason::NoData)?;

        let need = self.required_bars();
        if series.len() < need {
            return Err(SkipReason::InsufficientData {
                have: series.len(),
                need,
            });
        }

        if state.last_data_time == Some(bar.timestamp) {
            return Err(SkipReason::DuplicateBar {
                timestamp: bar.timestamp,
            });
        }

        if !self.backtest_mode {
            let age_secs = (now.timestamp_millis() - bar.timestamp) / 1000;
            if age_secs > self.stale_after_secs {
                return Err(SkipReason::StaleData { age_secs });
            }
        }

        Ok(bar)
    }

    /// Whether enough time has passed since the last signal.
    ///
    /// Always satisfied before the first signal, and when elapsed time
    /// cannot be computed.
    pub fn interval_satisfied(&self, last_signal_time: Option<i64>, bar_time: i64) -> bool {
        let Some(last) = last_signal_time else {
            return true;
        };
        match minutes_between(last, bar_time) {
            Some(elapsed) => elapsed >= self.min_interval_minutes,
            None => true,
        }
    }

    /// Classify a bar against window statistics. Breakout up wins ties.
    pub fn classify(&self, bar: &Bar, window: &WindowStats, interval_ok: bool) -> TurningPoint {
        if !interval_ok {
            return TurningPoint::None;
        }

        let volume_surge = bar.volume > window.volume_mean * self.volume_threshold;
        if !volume_surge {
            return TurningPoint::None;
        }

        let breaks_high =
            bar.close >= window.high || bar.close > window.high * (1.0 - BREAKOUT_TOLERANCE);
        if breaks_high {
            return TurningPoint::BreakoutUp;
        }

        let breaks_low =
            bar.close <= window.low || bar.close < window.low * (1.0 + BREAKOUT_TOLERANCE);
        if breaks_low {
            return TurningPoint::BreakoutDown;
        }

        TurningPoint::None
    }
}
