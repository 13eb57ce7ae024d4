//! Keeps the processor's catalog in step with live SKUs.
//!
//! [`InventorySyncApi`] is driven by the SKU events. A failed mirror is corrected locally by withdrawing the SKU from
//! sale, unless the processor simply does not know about a resource yet.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::Sku,
    events::{SkuCreatedEvent, SkuUpdatedEvent},
    processor::{CatalogItem, CatalogMirror, ExternalOutcome, ProcessorError},
    sfe_api::errors::CommerceError,
    traits::CatalogManagement,
};

/// What a sync attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Mirrored,
    /// The SKU is not for sale, so there was nothing to mirror.
    Skipped,
    /// The processor is missing a resource the mirror depends on. Nothing was changed.
    ResourceMissing,
    /// The mirror failed and the SKU was marked unavailable.
    Withdrawn,
}

pub struct InventorySyncApi<B, C> {
    db: B,
    mirror: C,
}

impl<B, C> Debug for InventorySyncApi<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InventorySyncApi")
    }
}

impl<B, C> InventorySyncApi<B, C> {
    pub fn new(db: B, mirror: C) -> Self {
        Self { db, mirror }
    }
}

impl<B, C> InventorySyncApi<B, C>
where
    B: CatalogManagement,
    C: CatalogMirror,
{
    /// Creates the processor catalog entry for a new live SKU.
    pub async fn on_sku_created(&self, event: SkuCreatedEvent) -> Result<SyncOutcome, CommerceError> {
        let sku = event.sku;
        let item = CatalogItem::from(&sku);
        debug!("📦️ Creating catalog entry for {}", sku.path());
        let outcome = self.mirror.create_catalog_item(&item).await.into();
        self.settle(&sku, outcome).await
    }

    /// Mirrors an edit of a live SKU. SKUs that are not available are left alone.
    pub async fn on_sku_updated(&self, event: SkuUpdatedEvent) -> Result<SyncOutcome, CommerceError> {
        let sku = event.sku;
        if !sku.is_available {
            trace!("📦️ {} is not available. Not mirroring the update", sku.path());
            return Ok(SyncOutcome::Skipped);
        }
        let item = CatalogItem::from(&sku);
        debug!("📦️ Updating catalog entry for {}", sku.path());
        let outcome = self.mirror.update_catalog_item(&item).await.into();
        self.settle(&sku, outcome).await
    }

    async fn settle<T>(&self, sku: &Sku, outcome: ExternalOutcome<T>) -> Result<SyncOutcome, CommerceError> {
        match outcome {
            ExternalOutcome::Ok(_) => {
                info!("📦️ {} mirrored to the processor catalog", sku.path());
                Ok(SyncOutcome::Mirrored)
            },
            ExternalOutcome::RecoverableExternalGap(e) => {
                debug!("📦️ Catalog mirror for {} skipped. {e}", sku.path());
                Ok(SyncOutcome::ResourceMissing)
            },
            ExternalOutcome::FatalExternalError(e) => self.withdraw(sku, e).await,
        }
    }

    /// Marks the SKU unavailable. This write does not publish a SKU event, so it cannot trigger another sync.
    async fn withdraw(&self, sku: &Sku, e: ProcessorError) -> Result<SyncOutcome, CommerceError> {
        error!("📦️ Could not mirror {} to the processor catalog. Withdrawing it from sale. {e}", sku.path());
        match self.db.set_sku_availability(&sku.provider_id, &sku.id, false).await? {
            Some(_) => Ok(SyncOutcome::Withdrawn),
            None => {
                warn!("📦️ {} disappeared before it could be withdrawn", sku.path());
                Ok(SyncOutcome::Withdrawn)
            },
        }
    }
}
