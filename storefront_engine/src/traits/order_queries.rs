use crate::{
    db_types::{ActorId, Order, ProviderId},
    traits::{OrderLedgerError, OrderQueryFilter},
};

/// Read-only order listings.
#[allow(async_fn_in_trait)]
pub trait OrderQueries {
    /// The buyer's order history, newest first.
    async fn fetch_orders_for_buyer(&self, buyer_id: &ActorId) -> Result<Vec<Order>, OrderLedgerError>;

    /// The provider's orders matching `filter`, newest first.
    async fn search_provider_orders(
        &self,
        provider_id: &ProviderId,
        filter: OrderQueryFilter,
    ) -> Result<Vec<Order>, OrderLedgerError>;
}
