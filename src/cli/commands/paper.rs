//! Paper trading command implementation.
//!
//! Every configured instrument gets its own task, replay feed and paper
//! broker. All of them share one order log.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use trading_broker::{ExecutionConfig, PaperBroker};
use trading_config::{AppConfig, SettingsError};
use trading_core::traits::Broker;
use trading_core::types::{Bar, PositionSnapshot};
use trading_data::{load_csv, ReplayFeed};
use trading_monitor::OrderLog;
use trading_strategies::{TrendFollowConfig, TrendFollowStrategy};

use crate::cli::PaperArgs;

/// Outcome of one instrument's replay.
struct ReplaySummary {
    instrument: String,
    cycles: usize,
    orders: usize,
    position: PositionSnapshot,
}

pub async fn run(args: PaperArgs, loaded: Result<AppConfig, SettingsError>) -> Result<()> {
    let config = loaded.context("Failed to load configuration")?;

    if !args.data.exists() {
        bail!(
            "Data path '{}' does not exist. Provide a CSV file or a directory of <instrument>.csv files",
            args.data.display()
        );
    }

    let order_log = Arc::new(
        OrderLog::open(&config.order_log.path).with_context(|| {
            format!("Failed to open order log {}", config.order_log.path.display())
        })?,
    );

    let mut execution = config.execution.clone();
    if let Some(wait) = config.paper.wait_time_secs {
        execution.wait_time_secs = wait;
    }
    // Marketable paper orders fill at placement
    execution.confirm_fills = execution.confirm_fills || config.paper.confirm_fills;
    let cadence = Duration::from_millis(args.cadence_ms.unwrap_or(config.paper.cadence_ms));

    let mut handles = Vec::with_capacity(config.strategies.len());
    for strategy_config in &config.strategies {
        let bars = load_bars(&args.data, &strategy_config.instrument)?;
        info!(
            instrument = %strategy_config.instrument,
            bars = bars.len(),
            "starting paper replay"
        );

        handles.push(tokio::spawn(replay(
            strategy_config.clone(),
            bars,
            execution.clone(),
            Arc::clone(&order_log),
            args.cycles,
            cadence,
        )));
    }

    let mut failed = false;
    for joined in futures::future::join_all(handles).await {
        match joined.context("Replay task panicked")? {
            Ok(summary) => {
                info!(
                    instrument = %summary.instrument,
                    cycles = summary.cycles,
                    orders = summary.orders,
                    long = summary.position.long(),
                    short = summary.position.short(),
                    "paper replay finished"
                );
            }
            Err(e) => {
                warn!("paper replay failed: {:#}", e);
                failed = true;
            }
        }
    }

    if failed {
        bail!("One or more paper replays failed");
    }
    info!(order_log = %order_log.path().display(), "paper trading complete");
    Ok(())
}

/// Bars for `instrument`: the file itself, or `<dir>/<instrument>.csv`.
fn load_bars(data: &Path, instrument: &str) -> Result<Vec<Bar>> {
    let path: PathBuf = if data.is_dir() {
        data.join(format!("{instrument}.csv"))
    } else {
        data.to_path_buf()
    };
    let path_str = path
        .to_str()
        .with_context(|| format!("Non UTF-8 data path {}", path.display()))?;

    let bars =
        load_csv(path_str).with_context(|| format!("Failed to load bars from {}", path.display()))?;
    if bars.is_empty() {
        bail!("No bars in {}", path.display());
    }
    Ok(bars)
}

/// Paper broker mark for a bar's close.
fn mark_price(instrument: &str, bar: &Bar) -> Result<Decimal> {
    Decimal::try_from(bar.close)
        .with_context(|| format!("Unrepresentable close {} for {instrument}", bar.close))
}

/// Drive one strategy through its bars, one bar per cycle.
async fn replay(
    config: TrendFollowConfig,
    bars: Vec<Bar>,
    execution: ExecutionConfig,
    order_log: Arc<OrderLog>,
    max_cycles: Option<usize>,
    cadence: Duration,
) -> Result<ReplaySummary> {
    let instrument = config.instrument.clone();
    let feed = Arc::new(ReplayFeed::new(bars));
    let broker = Arc::new(PaperBroker::new());
    let mut strategy =
        TrendFollowStrategy::new(config, feed.clone(), broker.clone(), order_log, execution)
            .with_context(|| format!("Invalid strategy configuration for {instrument}"))?;

    let mut cycles = 0;
    let mut orders = 0;

    while max_cycles.map_or(true, |max| cycles < max) {
        let Some(bar) = feed.advance() else {
            break;
        };
        broker.set_mark(&instrument, mark_price(&instrument, &bar)?);

        // The replay clock is the bar's own time, so recorded data is never stale
        let now = bar.datetime().unwrap_or_else(Utc::now);
        let records = strategy
            .on_cycle(now)
            .await
            .with_context(|| format!("Cycle {} failed for {instrument}", cycles + 1))?;

        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }

        cycles += 1;
        orders += records.len();

        if !cadence.is_zero() {
            tokio::time::sleep(cadence).await;
        }
    }

    let position = broker.get_position(&instrument).await?;
    Ok(ReplaySummary {
        instrument,
        cycles,
        orders,
        position,
    })
}
