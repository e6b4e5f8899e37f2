//! Order execution and broker integrations.

mod execution;
mod paper;

pub use execution::{ExecutionConfig, OrderExecutor};
pub use paper::{BrokerEvent, PaperBroker};
