//! Broker trait definition.

use crate::error::BrokerError;
use crate::types::{OrderRequest, PositionSnapshot};
use async_trait::async_trait;

/// Trait for broker integrations.
///
/// The strategy treats the broker as the source of truth for positions and
/// never keeps its own ledger. No timeout is applied to these calls; a hung
/// collaborator blocks the calling cycle.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Get the current position split into today-opened and carried lots.
    ///
    /// # Arguments
    /// * `instrument` - The instrument to look up
    async fn get_position(&self, instrument: &str) -> Result<PositionSnapshot, BrokerError>;

    /// Submit a new order.
    ///
    /// # Returns
    /// An order identifier, opaque to the caller
    async fn place_order(&self, request: &OrderRequest) -> Result<String, BrokerError>;

    /// Cancel an existing order.
    ///
    /// Callers treat this as idempotent: cancelling a filled or already
    /// cancelled order must not be reported as an error.
    async fn cancel_order(&self, order_id: &str) -> Result<(), BrokerError>;

    /// Whether an order has been completely filled.
    ///
    /// Only consulted when fill confirmation is enabled. Brokers that cannot
    /// report fills keep the default, which answers "not filled".
    async fn is_filled(&self, _order_id: &str) -> Result<bool, BrokerError> {
        Ok(false)
    }

    /// Re-authenticate the broker session.
    async fn relog(&self) -> Result<(), BrokerError>;

    /// Get the broker name.
    fn name(&self) -> &str;
}
