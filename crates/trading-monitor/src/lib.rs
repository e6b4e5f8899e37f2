//! Observability: tracing setup and the order log.

mod logging;
mod order_log;

pub use logging::setup_logging;
pub use order_log::{OrderLog, OrderLogEntry};
