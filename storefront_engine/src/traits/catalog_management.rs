use thiserror::Error;

use crate::{
    db_types::{Product, ProductInput, ProviderId, Sku, SkuInput},
    traits::{DraftPublication, SkuWrite},
};

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product draft {0} does not exist")]
    DraftNotFound(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(String),
    /// Live SKU ids are unique per provider, since they double as the processor catalog key.
    #[error("SKU {sku_id} already belongs to product {product_id}")]
    SkuIdTaken { sku_id: String, product_id: String },
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

/// Storage for products and SKUs, both live and draft.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_product_draft(
        &self,
        provider_id: &ProviderId,
        product_id: &str,
    ) -> Result<Option<Product>, CatalogError>;

    async fn fetch_sku_drafts(&self, provider_id: &ProviderId, product_id: &str) -> Result<Vec<Sku>, CatalogError>;

    async fn fetch_product(&self, provider_id: &ProviderId, product_id: &str) -> Result<Option<Product>, CatalogError>;

    async fn fetch_sku(&self, provider_id: &ProviderId, sku_id: &str) -> Result<Option<Sku>, CatalogError>;

    async fn fetch_skus(&self, provider_id: &ProviderId, product_id: &str) -> Result<Vec<Sku>, CatalogError>;

    /// Creates or replaces a product draft. Drafts are never available.
    async fn save_product_draft(
        &self,
        provider_id: &ProviderId,
        product_id: &str,
        input: ProductInput,
    ) -> Result<Product, CatalogError>;

    /// Creates or replaces a SKU draft. The product draft must exist.
    async fn save_sku_draft(
        &self,
        provider_id: &ProviderId,
        product_id: &str,
        sku_id: &str,
        input: SkuInput,
    ) -> Result<Sku, CatalogError>;

    /// Creates or replaces a live SKU. The live product must exist.
    async fn upsert_sku(
        &self,
        provider_id: &ProviderId,
        product_id: &str,
        sku_id: &str,
        input: SkuInput,
    ) -> Result<SkuWrite, CatalogError>;

    /// Overwrites only the availability flag of a live SKU. Returns the updated SKU, or `None` if it does not exist.
    async fn set_sku_availability(
        &self,
        provider_id: &ProviderId,
        sku_id: &str,
        is_available: bool,
    ) -> Result<Option<Sku>, CatalogError>;

    /// Promotes a product draft and all its SKU drafts to the live catalog, and deletes the drafts, in one
    /// transaction.
    ///
    /// Returns `DraftNotFound` if there is no such draft, and [`DraftPublication::NoSkus`] without writing anything if
    /// the draft has no SKUs.
    async fn publish_draft(&self, provider_id: &ProviderId, product_id: &str) -> Result<DraftPublication, CatalogError>;
}
