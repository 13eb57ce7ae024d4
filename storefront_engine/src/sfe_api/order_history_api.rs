use std::fmt::Debug;

use crate::{
    db_types::{Order, OrderId},
    sfe_api::{auth_context::AuthContext, errors::CommerceError},
    traits::{OrderLedger, OrderQueries, OrderQueryFilter},
};

/// Read access to orders, scoped to the caller.
pub struct OrderHistoryApi<B> {
    db: B,
}

impl<B> Debug for OrderHistoryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderHistoryApi")
    }
}

impl<B> OrderHistoryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderHistoryApi<B>
where B: OrderQueries
{
    /// The caller's own purchases, newest first.
    pub async fn orders_for_buyer(&self, ctx: &AuthContext) -> Result<Vec<Order>, CommerceError> {
        Ok(self.db.fetch_orders_for_buyer(&ctx.actor_id).await?)
    }

    /// Orders placed with the caller's provider.
    pub async fn provider_orders(
        &self,
        ctx: &AuthContext,
        filter: OrderQueryFilter,
    ) -> Result<Vec<Order>, CommerceError> {
        let provider_id = ctx.require_provider()?;
        Ok(self.db.search_provider_orders(provider_id, filter).await?)
    }
}

impl<B> OrderHistoryApi<B>
where B: OrderLedger
{
    /// A single order, as seen by its provider or its buyer.
    pub async fn order_for_actor(&self, ctx: &AuthContext, order_id: &OrderId) -> Result<Order, CommerceError> {
        if let Some(provider_id) = &ctx.provider_id {
            if let Some(order) = self.db.fetch_order_for_provider(order_id, provider_id).await? {
                return Ok(order);
            }
        }
        self.db
            .fetch_order_for_buyer(order_id, &ctx.actor_id)
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("The order does not exist. {order_id}")))
    }
}
