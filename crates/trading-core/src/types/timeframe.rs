//! Bar granularity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Granularity of bars requested from the market data adapter.
///
/// Serialized with the broker's granularity strings (`1s`, `1min`, `1h`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "1s")]
    Second1,
    #[serde(rename = "5s")]
    Second5,
    #[serde(rename = "1min", alias = "1m")]
    #[default]
    Minute1,
    #[serde(rename = "5min", alias = "5m")]
    Minute5,
    #[serde(rename = "15min", alias = "15m")]
    Minute15,
    #[serde(rename = "30min", alias = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Daily,
}

impl Timeframe {
    /// Get the duration of one bar in seconds.
    pub fn as_secs(&self) -> u64 {
        match self {
            Timeframe::Second1 => 1,
            Timeframe::Second5 => 5,
            Timeframe::Minute1 => 60,
            Timeframe::Minute5 => 300,
            Timeframe::Minute15 => 900,
            Timeframe::Minute30 => 1800,
            Timeframe::Hour1 => 3600,
            Timeframe::Daily => 86400,
        }
    }

    /// Get the duration of one bar in milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.as_secs() * 1000
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::Second1 => "1s",
            Timeframe::Second5 => "5s",
            Timeframe::Minute1 => "1min",
            Timeframe::Minute5 => "5min",
            Timeframe::Minute15 => "15min",
            Timeframe::Minute30 => "30min",
            Timeframe::Hour1 => "1h",
            Timeframe::Daily => "1d",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1s" => Ok(Timeframe::Second1),
            "5s" => Ok(Timeframe::Second5),
            "1m" | "1min" | "minute" => Ok(Timeframe::Minute1),
            "5m" | "5min" => Ok(Timeframe::Minute5),
            "15m" | "15min" => Ok(Timeframe::Minute15),
            "30m" | "30min" => Ok(Timeframe::Minute30),
            "1h" | "1hour" | "hour" => Ok(Timeframe::Hour1),
            "1d" | "day" | "daily" => Ok(Timeframe::Daily),
            _ => Err(format!("Invalid timeframe: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_duration() {
        assert_eq!(Timeframe::Second5.as_secs(), 5);
        assert_eq!(Timeframe::Minute1.as_millis(), 60_000);
        assert_eq!(Timeframe::Hour1.as_secs(), 3600);
    }

    #[test]
    fn test_timeframe_parse_and_display() {
        assert_eq!(Timeframe::from_str("1min").unwrap(), Timeframe::Minute1);
        assert_eq!(Timeframe::from_str("1m").unwrap(), Timeframe::Minute1);
        assert_eq!(Timeframe::from_str("5s").unwrap(), Timeframe::Second5);
        assert!(Timeframe::from_str("1w").is_err());
        assert_eq!(Timeframe::Minute1.to_string(), "1min");
        assert_eq!(Timeframe::default(), Timeframe::Minute1);
    }
}
