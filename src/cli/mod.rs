//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "turning-point")]
#[command(author, version, about = "Turning-point trend-following strategy runner")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TRADING_CONFIG", default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (overrides the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay recorded bars through every configured strategy against a paper broker
    Paper(PaperArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct PaperArgs {
    /// Bar data: a CSV file used for every instrument, or a directory
    /// holding `<instrument>.csv` files
    #[arg(short, long)]
    pub data: PathBuf,

    /// Stop after this many cycles per instrument
    #[arg(long)]
    pub cycles: Option<usize>,

    /// Pause between cycles (overrides `paper.cadence_ms`)
    #[arg(long)]
    pub cadence_ms: Option<u64>,
}
