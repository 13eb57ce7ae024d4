//! `SqliteDatabase` is a concrete implementation of a storefront engine backend.
//!
//! It uses SQLite as the backend and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::SqlitePool;

use super::db::{
    accounts,
    catalog::{self, Collection},
    db_url,
    new_pool,
    operators,
    orders::{self, OrderCopy},
};
use crate::{
    db_types::{
        ActorId,
        NewOrder,
        Order,
        OrderId,
        PaymentStatus,
        PaymentUpdate,
        PayoutAccount,
        Permission,
        Product,
        ProductInput,
        ProviderId,
        Sku,
        SkuInput,
    },
    helpers::next_update_timestamp,
    traits::{
        AccountApiError,
        AccountManagement,
        CatalogError,
        CatalogManagement,
        DraftPublication,
        InsertOrderResult,
        OrderLedger,
        OrderLedgerError,
        OrderQueries,
        OrderQueryFilter,
        PermissionManagement,
        SkuWrite,
        StorefrontDatabase,
        TransitionResult,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderLedger for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, OrderLedgerError> {
        let mut tx = self.pool.begin().await?;
        if let Some(existing) = orders::fetch_order(OrderCopy::Provider, &order.id, &mut tx).await? {
            debug!("🗃️ Order {} already exists. Insert skipped.", order.id);
            return Ok(InsertOrderResult::AlreadyExists(existing));
        }
        orders::insert_order(&order, Utc::now(), &mut tx).await?;
        let stored = orders::fetch_order(OrderCopy::Provider, &order.id, &mut tx)
            .await?
            .ok_or_else(|| OrderLedgerError::Corrupted(format!("Order {} vanished straight after insert", order.id)))?;
        tx.commit().await?;
        Ok(InsertOrderResult::Inserted(stored))
    }

    async fn apply_transition<F>(
        &self,
        order_id: &OrderId,
        provider_id: &ProviderId,
        expected: &[PaymentStatus],
        mutation: F,
    ) -> Result<TransitionResult, OrderLedgerError>
    where
        F: FnOnce(&Order) -> PaymentUpdate + Send,
    {
        let mut tx = self.pool.begin().await?;
        let current = orders::fetch_order(OrderCopy::Provider, order_id, &mut tx)
            .await?
            .filter(|o| &o.provided_by == provider_id)
            .ok_or_else(|| OrderLedgerError::OrderNotFound(order_id.clone()))?;
        let buyer_copy = orders::fetch_order(OrderCopy::Buyer, order_id, &mut tx).await?.ok_or_else(|| {
            error!("🗃️ Order {order_id} has a provider copy but no copy for buyer {}", current.purchased_by);
            OrderLedgerError::Corrupted(format!("Buyer copy of order {order_id} is missing"))
        })?;
        if buyer_copy.purchased_by != current.purchased_by || buyer_copy.payment_status != current.payment_status {
            error!(
                "🗃️ The copies of order {order_id} disagree. Provider: {}/{}, buyer: {}/{}",
                current.purchased_by, current.payment_status, buyer_copy.purchased_by, buyer_copy.payment_status
            );
            return Err(OrderLedgerError::Corrupted(format!("The copies of order {order_id} disagree")));
        }
        let observed = current.payment_status;
        if !expected.contains(&observed) {
            debug!("🗃️ Order {order_id} is {observed}, which is not one of {expected:?}. No changes made.");
            return Err(OrderLedgerError::UnexpectedStatus { order_id: order_id.clone(), status: observed });
        }
        let update = mutation(&current);
        if !observed.can_transition_to(update.payment_status) {
            return Err(OrderLedgerError::IllegalTransition {
                order_id: order_id.clone(),
                from: observed,
                to: update.payment_status,
            });
        }
        let previous = current.updated_at.max(buyer_copy.updated_at);
        let updated_at = next_update_timestamp(Utc::now(), previous);
        let result_json = update.payment_result.as_ref().map(serde_json::to_string).transpose()?;
        for copy in [OrderCopy::Provider, OrderCopy::Buyer] {
            let rows = orders::update_payment(
                copy,
                order_id,
                observed,
                update.payment_status,
                result_json.as_deref(),
                updated_at,
                &mut tx,
            )
            .await?;
            if rows != 1 {
                warn!("🗃️ Order {order_id} changed while it was being updated. Rolling back.");
                return Err(OrderLedgerError::WriteConflict(order_id.clone()));
            }
        }
        tx.commit().await?;
        info!("🗃️ Order {order_id} moved from {observed} to {}", update.payment_status);
        let order = Order {
            payment_status: update.payment_status,
            payment_result: update.payment_result.or(current.payment_result),
            updated_at,
            ..current
        };
        Ok(TransitionResult { previous_status: observed, order })
    }

    async fn fetch_order_for_provider(
        &self,
        order_id: &OrderId,
        provider_id: &ProviderId,
    ) -> Result<Option<Order>, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(OrderCopy::Provider, order_id, &mut conn).await?;
        Ok(order.filter(|o| &o.provided_by == provider_id))
    }

    async fn fetch_order_for_buyer(
        &self,
        order_id: &OrderId,
        buyer_id: &ActorId,
    ) -> Result<Option<Order>, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(OrderCopy::Buyer, order_id, &mut conn).await?;
        Ok(order.filter(|o| &o.purchased_by == buyer_id))
    }
}

impl OrderQueries for SqliteDatabase {
    async fn fetch_orders_for_buyer(&self, buyer_id: &ActorId) -> Result<Vec<Order>, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_buyer(buyer_id, &mut conn).await
    }

    async fn search_provider_orders(
        &self,
        provider_id: &ProviderId,
        filter: OrderQueryFilter,
    ) -> Result<Vec<Order>, OrderLedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::search_provider_orders(provider_id, filter, &mut conn).await
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product_draft(
        &self,
        provider_id: &ProviderId,
        product_id: &str,
    ) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_product(Collection::Draft, provider_id, product_id, &mut conn).await
    }

    async fn fetch_sku_drafts(&self, provider_id: &ProviderId, product_id: &str) -> Result<Vec<Sku>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_skus_for_product(Collection::Draft, provider_id, product_id, &mut conn).await
    }

    async fn fetch_product(&self, provider_id: &ProviderId, product_id: &str) -> Result<Option<Product>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_product(Collection::Live, provider_id, product_id, &mut conn).await
    }

    async fn fetch_sku(&self, provider_id: &ProviderId, sku_id: &str) -> Result<Option<Sku>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_live_sku(provider_id, sku_id, &mut conn).await
    }

    async fn fetch_skus(&self, provider_id: &ProviderId, product_id: &str) -> Result<Vec<Sku>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_skus_for_product(Collection::Live, provider_id, product_id, &mut conn).await
    }

    async fn save_product_draft(
        &self,
        provider_id: &ProviderId,
        product_id: &str,
        input: ProductInput,
    ) -> Result<Product, CatalogError> {
        let mut tx = self.pool.begin().await?;
        catalog::upsert_product(Collection::Draft, provider_id, product_id, &input, false, Utc::now(), &mut tx).await?;
        let draft = catalog::fetch_product(Collection::Draft, provider_id, product_id, &mut tx)
            .await?
            .ok_or_else(|| CatalogError::DraftNotFound(format!("{provider_id}/{product_id}")))?;
        tx.commit().await?;
        Ok(draft)
    }

    async fn save_sku_draft(
        &self,
        provider_id: &ProviderId,
        product_id: &str,
        sku_id: &str,
        input: SkuInput,
    ) -> Result<Sku, CatalogError> {
        let mut tx = self.pool.begin().await?;
        if catalog::fetch_product(Collection::Draft, provider_id, product_id, &mut tx).await?.is_none() {
            return Err(CatalogError::DraftNotFound(format!("{provider_id}/{product_id}")));
        }
        catalog::upsert_sku(Collection::Draft, provider_id, product_id, sku_id, &input, Utc::now(), &mut tx).await?;
        let sku = catalog::fetch_skus_for_product(Collection::Draft, provider_id, product_id, &mut tx)
            .await?
            .into_iter()
            .find(|s| s.id == sku_id)
            .ok_or_else(|| CatalogError::DraftNotFound(format!("{provider_id}/{product_id}/{sku_id}")))?;
        tx.commit().await?;
        Ok(sku)
    }

    async fn upsert_sku(
        &self,
        provider_id: &ProviderId,
        product_id: &str,
        sku_id: &str,
        input: SkuInput,
    ) -> Result<SkuWrite, CatalogError> {
        let mut tx = self.pool.begin().await?;
        if catalog::fetch_product(Collection::Live, provider_id, product_id, &mut tx).await?.is_none() {
            return Err(CatalogError::ProductNotFound(format!("{provider_id}/{product_id}")));
        }
        let created = catalog::claim_live_sku(provider_id, product_id, sku_id, &mut tx).await?.is_none();
        catalog::upsert_sku(Collection::Live, provider_id, product_id, sku_id, &input, Utc::now(), &mut tx).await?;
        let sku = catalog::fetch_live_sku(provider_id, sku_id, &mut tx)
            .await?
            .ok_or_else(|| CatalogError::ProductNotFound(format!("{provider_id}/{product_id}/{sku_id}")))?;
        tx.commit().await?;
        Ok(SkuWrite { sku, created })
    }

    async fn set_sku_availability(
        &self,
        provider_id: &ProviderId,
        sku_id: &str,
        is_available: bool,
    ) -> Result<Option<Sku>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        catalog::set_sku_availability(provider_id, sku_id, is_available, Utc::now(), &mut conn).await
    }

    async fn publish_draft(&self, provider_id: &ProviderId, product_id: &str) -> Result<DraftPublication, CatalogError> {
        let mut tx = self.pool.begin().await?;
        let draft = catalog::fetch_product(Collection::Draft, provider_id, product_id, &mut tx)
            .await?
            .ok_or_else(|| CatalogError::DraftNotFound(format!("{provider_id}/{product_id}")))?;
        let drafts = catalog::fetch_skus_for_product(Collection::Draft, provider_id, product_id, &mut tx).await?;
        if drafts.is_empty() {
            debug!("🗃️ Draft {provider_id}/{product_id} has no SKUs. Nothing published.");
            return Ok(DraftPublication::NoSkus);
        }
        let mut created = Vec::with_capacity(drafts.len());
        for d in &drafts {
            created.push(catalog::claim_live_sku(provider_id, product_id, &d.id, &mut tx).await?.is_none());
        }
        let now = Utc::now();
        let input = ProductInput { name: draft.name, caption: draft.caption, description: draft.description };
        catalog::upsert_product(Collection::Live, provider_id, product_id, &input, true, now, &mut tx).await?;
        let mut skus = Vec::with_capacity(drafts.len());
        for (d, created) in drafts.into_iter().zip(created) {
            let input =
                SkuInput { inventory: d.inventory, price: d.price, currency: d.currency, is_available: d.is_available };
            catalog::upsert_sku(Collection::Live, provider_id, product_id, &d.id, &input, now, &mut tx).await?;
            let sku = catalog::fetch_live_sku(provider_id, &d.id, &mut tx)
                .await?
                .ok_or_else(|| CatalogError::ProductNotFound(format!("{provider_id}/{product_id}/{}", d.id)))?;
            skus.push(SkuWrite { sku, created });
        }
        catalog::delete_draft(provider_id, product_id, &mut tx).await?;
        let product = catalog::fetch_product(Collection::Live, provider_id, product_id, &mut tx)
            .await?
            .ok_or_else(|| CatalogError::ProductNotFound(format!("{provider_id}/{product_id}")))?;
        tx.commit().await?;
        info!("🗃️ Published {provider_id}/{product_id} with {} SKUs", skus.len());
        Ok(DraftPublication::Published { product, skus })
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_payout_account(&self, actor_id: &ActorId) -> Result<Option<PayoutAccount>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        accounts::fetch_payout_account(actor_id, &mut conn).await
    }

    async fn upsert_payout_account(
        &self,
        actor_id: &ActorId,
        external_account_id: &str,
    ) -> Result<PayoutAccount, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        accounts::upsert_payout_account(actor_id, external_account_id, Utc::now(), &mut conn).await
    }
}

impl PermissionManagement for SqliteDatabase {
    async fn fetch_operator_permissions(
        &self,
        provider_id: &ProviderId,
        actor_id: &ActorId,
    ) -> Result<Vec<Permission>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        operators::fetch_permissions(provider_id, actor_id, &mut conn).await
    }

    async fn grant_operator_permissions(
        &self,
        provider_id: &ProviderId,
        actor_id: &ActorId,
        permissions: &[Permission],
    ) -> Result<(), AccountApiError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        for p in permissions {
            operators::grant_permission(provider_id, actor_id, *p, now, &mut tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

impl StorefrontDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the `SF_DATABASE_URL` environment variable
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}
