//! Collaborator traits consumed by the strategy core.

mod broker;
mod data_source;

pub use broker::Broker;
pub use data_source::MarketData;
