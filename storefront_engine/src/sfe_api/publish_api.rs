use std::fmt::Debug;

use log::*;

use crate::{
    db_types::Permission,
    events::{EventProducers, SkuCreatedEvent, SkuUpdatedEvent},
    helpers::DocPath,
    sfe_api::{
        auth_context::{AuthContext, PermissionGuard},
        errors::{CommerceError, INVALID_PATH_MESSAGE, NO_SKU_MESSAGE},
    },
    traits::{CatalogError, CatalogManagement, DraftPublication, PermissionManagement, SkuWrite},
};

/// Promotes product drafts to the live catalog.
pub struct PublishApi<B> {
    db: B,
    guard: PermissionGuard<B>,
    producers: EventProducers,
}

impl<B> Debug for PublishApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublishApi")
    }
}

impl<B: Clone> PublishApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        let guard = PermissionGuard::new(db.clone());
        Self { db, guard, producers }
    }
}

impl<B> PublishApi<B>
where B: CatalogManagement + PermissionManagement
{
    /// Publishes the product draft at `draft_path` together with all of its SKU drafts.
    ///
    /// The caller needs write permission on the draft's provider. The draft is copied to the live catalog (as
    /// available) and deleted in a single transaction. A draft without SKUs is refused and nothing is written.
    ///
    /// Returns the live paths that were written, the product first.
    pub async fn publish(&self, ctx: &AuthContext, draft_path: &str) -> Result<Vec<String>, CommerceError> {
        let path = match draft_path.parse::<DocPath>() {
            Ok(path @ DocPath::ProductDraft { .. }) => path,
            Ok(_) | Err(_) => {
                debug!("📦️ {draft_path} is not a product draft path");
                return Err(CommerceError::InvalidArgument(INVALID_PATH_MESSAGE.to_string()));
            },
        };
        let provider_id = path.provider_id();
        self.guard.authorize_operator(ctx, provider_id, Permission::Write).await?;
        let publication = match self.db.publish_draft(provider_id, path.product_id()).await {
            Ok(p) => p,
            Err(CatalogError::DraftNotFound(p)) => {
                debug!("📦️ Draft {p} does not exist");
                return Err(CommerceError::InvalidArgument(INVALID_PATH_MESSAGE.to_string()));
            },
            Err(e) => return Err(e.into()),
        };
        match publication {
            DraftPublication::NoSkus => {
                info!("📦️ {path} has no SKUs and was not published");
                Err(CommerceError::Conflict { message: NO_SKU_MESSAGE.to_string(), target: None })
            },
            DraftPublication::Published { product, skus } => {
                let mut paths = Vec::with_capacity(skus.len() + 1);
                paths.push(product.path().to_string());
                paths.extend(skus.iter().map(|w| w.sku.path().to_string()));
                info!("📦️ {} published by {} with {} SKUs", product.path(), ctx.actor_id, skus.len());
                for write in skus {
                    publish_sku_write(&self.producers, write).await;
                }
                Ok(paths)
            },
        }
    }
}

pub(crate) async fn publish_sku_write(producers: &EventProducers, write: SkuWrite) {
    if write.created {
        producers.publish_sku_created(SkuCreatedEvent::new(write.sku)).await;
    } else {
        producers.publish_sku_updated(SkuUpdatedEvent::new(write.sku)).await;
    }
}
