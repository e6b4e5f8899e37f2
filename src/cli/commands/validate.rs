//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use tracing::debug;
use trading_config::{to_toml, AppConfig, SettingsError};

pub async fn run(config_path: &Path, loaded: Result<AppConfig, SettingsError>) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    match loaded {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Order log: {}", config.order_log.path.display());
            println!(
                "Execution: {} attempts, {}s wait, fill confirmation {}",
                config.execution.max_retry,
                config.execution.wait_time_secs,
                if config.execution.confirm_fills { "on" } else { "off" }
            );
            for strategy in &config.strategies {
                println!(
                    "Strategy {}.{}: {} bars, window {}, volume x{}, interval {}min, tp {} / sl {}",
                    strategy.exchange,
                    strategy.instrument,
                    strategy.timeframe,
                    strategy.window_size,
                    strategy.volume_threshold,
                    strategy.min_interval,
                    strategy.take_profit,
                    strategy.stop_loss
                );
            }
            debug!("effective configuration:\n{}", to_toml(&config)?);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
