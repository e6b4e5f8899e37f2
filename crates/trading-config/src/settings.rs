//! Configuration structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use trading_broker::ExecutionConfig;
use trading_core::error::StrategyError;
use trading_strategies::TrendFollowConfig;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub order_log: OrderLogSettings,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub paper: PaperSettings,
    /// One entry per traded instrument
    #[serde(default)]
    pub strategies: Vec<TrendFollowConfig>,
}

impl AppConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), StrategyError> {
        self.execution.validate()?;
        self.logging.validate()?;

        if self.strategies.is_empty() {
            return Err(StrategyError::InvalidConfig(
                "at least one strategy is required".into(),
            ));
        }
        for (i, strategy) in self.strategies.iter().enumerate() {
            strategy.validate().map_err(|e| {
                StrategyError::InvalidConfig(format!("strategies[{i}] ({}): {e}", strategy.instrument))
            })?;
            if self.strategies[..i]
                .iter()
                .any(|other| other.instrument == strategy.instrument)
            {
                return Err(StrategyError::InvalidConfig(format!(
                    "instrument {} is configured twice",
                    strategy.instrument
                )));
            }
        }
        Ok(())
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "turning-point".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    fn validate(&self) -> Result<(), StrategyError> {
        match self.format.to_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(StrategyError::InvalidConfig(format!(
                "unknown log format: {other}"
            ))),
        }
    }
}

/// Order log destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLogSettings {
    pub path: PathBuf,
}

impl Default for OrderLogSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("result/order_book.txt"),
        }
    }
}

/// Paper run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperSettings {
    /// Pause between replay cycles
    pub cadence_ms: u64,
    /// Overrides `execution.wait_time_secs` during paper runs
    pub wait_time_secs: Option<u64>,
    /// Stop chasing once the paper broker reports a fill
    pub confirm_fills: bool,
}

impl Default for PaperSettings {
    fn default() -> Self {
        Self {
            cadence_ms: 0,
            wait_time_secs: Some(0),
            confirm_fills: true,
        }
    }
}
