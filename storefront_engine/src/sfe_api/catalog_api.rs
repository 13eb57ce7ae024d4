use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Permission, Product, ProductInput, ProviderId, Sku, SkuInput},
    events::EventProducers,
    sfe_api::{
        auth_context::{AuthContext, PermissionGuard},
        errors::CommerceError,
        publish_api::publish_sku_write,
    },
    traits::{CatalogManagement, PermissionManagement},
};

/// Seller edits to drafts and live SKUs.
pub struct CatalogApi<B> {
    db: B,
    guard: PermissionGuard<B>,
    producers: EventProducers,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B: Clone> CatalogApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        let guard = PermissionGuard::new(db.clone());
        Self { db, guard, producers }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement + PermissionManagement
{
    pub async fn save_product_draft(
        &self,
        ctx: &AuthContext,
        provider_id: &ProviderId,
        product_id: &str,
        input: ProductInput,
    ) -> Result<Product, CommerceError> {
        check_id(product_id)?;
        self.guard.authorize_operator(ctx, provider_id, Permission::Write).await?;
        let product = self.db.save_product_draft(provider_id, product_id, input).await?;
        debug!("📦️ {} saved by {}", product.draft_path(), ctx.actor_id);
        Ok(product)
    }

    pub async fn save_sku_draft(
        &self,
        ctx: &AuthContext,
        provider_id: &ProviderId,
        product_id: &str,
        sku_id: &str,
        input: SkuInput,
    ) -> Result<Sku, CommerceError> {
        check_id(product_id)?;
        check_id(sku_id)?;
        self.guard.authorize_operator(ctx, provider_id, Permission::Write).await?;
        let sku = self.db.save_sku_draft(provider_id, product_id, sku_id, input).await?;
        debug!("📦️ SKU draft {sku_id} of {provider_id}/{product_id} saved by {}", ctx.actor_id);
        Ok(sku)
    }

    /// Edits a live SKU directly. The change is mirrored to the processor through the SKU event hooks.
    pub async fn upsert_sku(
        &self,
        ctx: &AuthContext,
        provider_id: &ProviderId,
        product_id: &str,
        sku_id: &str,
        input: SkuInput,
    ) -> Result<Sku, CommerceError> {
        check_id(product_id)?;
        check_id(sku_id)?;
        self.guard.authorize_operator(ctx, provider_id, Permission::Write).await?;
        let write = self.db.upsert_sku(provider_id, product_id, sku_id, input).await?;
        let sku = write.sku.clone();
        info!("📦️ {} {} by {}", sku.path(), if write.created { "created" } else { "updated" }, ctx.actor_id);
        publish_sku_write(&self.producers, write).await;
        Ok(sku)
    }
}

fn check_id(id: &str) -> Result<(), CommerceError> {
    if id.trim().is_empty() || id.contains('/') {
        Err(CommerceError::InvalidArgument(format!("'{id}' is not a valid catalog id.")))
    } else {
        Ok(())
    }
}
