use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Product, ProductInput, ProviderId, Sku, SkuInput},
    traits::CatalogError,
};

const PRODUCT_COLUMNS: &str = "id, provider_id, name, caption, description, is_available, created_at, updated_at";
const SKU_COLUMNS: &str =
    "id, provider_id, product_id, inventory, price, currency, is_available, created_at, updated_at";

/// Live records and their drafts live in separate tables with identical shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Live,
    Draft,
}

impl Collection {
    fn products(&self) -> &'static str {
        match self {
            Collection::Live => "products",
            Collection::Draft => "product_drafts",
        }
    }

    fn skus(&self) -> &'static str {
        match self {
            Collection::Live => "skus",
            Collection::Draft => "sku_drafts",
        }
    }

    fn sku_key(&self) -> &'static str {
        match self {
            Collection::Live => "provider_id, id",
            Collection::Draft => "provider_id, product_id, id",
        }
    }
}

pub async fn fetch_product(
    collection: Collection,
    provider_id: &ProviderId,
    product_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, CatalogError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM {} WHERE provider_id = $1 AND id = $2", collection.products());
    let product = sqlx::query_as::<_, Product>(&sql).bind(provider_id).bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_skus_for_product(
    collection: Collection,
    provider_id: &ProviderId,
    product_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Sku>, CatalogError> {
    let sql = format!(
        "SELECT {SKU_COLUMNS} FROM {} WHERE provider_id = $1 AND product_id = $2 ORDER BY id ASC",
        collection.skus()
    );
    let skus = sqlx::query_as::<_, Sku>(&sql).bind(provider_id).bind(product_id).fetch_all(conn).await?;
    Ok(skus)
}

pub async fn fetch_live_sku(
    provider_id: &ProviderId,
    sku_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Sku>, CatalogError> {
    let sql = format!("SELECT {SKU_COLUMNS} FROM skus WHERE provider_id = $1 AND id = $2");
    let sku = sqlx::query_as::<_, Sku>(&sql).bind(provider_id).bind(sku_id).fetch_optional(conn).await?;
    Ok(sku)
}

/// The live SKU `sku_id`, unless it belongs to a product other than `product_id`.
pub async fn claim_live_sku(
    provider_id: &ProviderId,
    product_id: &str,
    sku_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Sku>, CatalogError> {
    match fetch_live_sku(provider_id, sku_id, conn).await? {
        Some(sku) if sku.product_id != product_id => {
            Err(CatalogError::SkuIdTaken { sku_id: sku_id.to_string(), product_id: sku.product_id })
        },
        existing => Ok(existing),
    }
}

/// Creates or replaces a product. `created_at` is kept on replacement.
pub async fn upsert_product(
    collection: Collection,
    provider_id: &ProviderId,
    product_id: &str,
    input: &ProductInput,
    is_available: bool,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), CatalogError> {
    let sql = format!(
        "INSERT INTO {} (provider_id, id, name, caption, description, is_available, created_at, updated_at) VALUES \
         ($1, $2, $3, $4, $5, $6, $7, $8) ON CONFLICT (provider_id, id) DO UPDATE SET name = excluded.name, caption \
         = excluded.caption, description = excluded.description, is_available = excluded.is_available, updated_at = \
         excluded.updated_at",
        collection.products()
    );
    sqlx::query(&sql)
        .bind(provider_id)
        .bind(product_id)
        .bind(&input.name)
        .bind(&input.caption)
        .bind(&input.description)
        .bind(is_available)
        .bind(now)
        .bind(now)
        .execute(conn)
        .await?;
    trace!("🗃️ Product {provider_id}/{product_id} written to {}", collection.products());
    Ok(())
}

/// Creates or replaces a SKU. `created_at` is kept on replacement.
pub async fn upsert_sku(
    collection: Collection,
    provider_id: &ProviderId,
    product_id: &str,
    sku_id: &str,
    input: &SkuInput,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<(), CatalogError> {
    let sql = format!(
        "INSERT INTO {} (provider_id, id, product_id, inventory, price, currency, is_available, created_at, \
         updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) ON CONFLICT ({}) DO UPDATE SET inventory = \
         excluded.inventory, price = excluded.price, currency = excluded.currency, \
         is_available = excluded.is_available, updated_at = excluded.updated_at",
        collection.skus(),
        collection.sku_key()
    );
    sqlx::query(&sql)
        .bind(provider_id)
        .bind(sku_id)
        .bind(product_id)
        .bind(input.inventory)
        .bind(input.price)
        .bind(&input.currency)
        .bind(input.is_available)
        .bind(now)
        .bind(now)
        .execute(conn)
        .await?;
    trace!("🗃️ SKU {provider_id}/{product_id}/{sku_id} written to {}", collection.skus());
    Ok(())
}

/// Returns `None` if there is no such live SKU.
pub async fn set_sku_availability(
    provider_id: &ProviderId,
    sku_id: &str,
    is_available: bool,
    now: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Sku>, CatalogError> {
    let result = sqlx::query("UPDATE skus SET is_available = $1, updated_at = $2 WHERE provider_id = $3 AND id = $4")
        .bind(is_available)
        .bind(now)
        .bind(provider_id)
        .bind(sku_id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    fetch_live_sku(provider_id, sku_id, conn).await
}

/// Deletes a product draft and all of its SKU drafts. Returns the number of SKU drafts removed.
pub async fn delete_draft(
    provider_id: &ProviderId,
    product_id: &str,
    conn: &mut SqliteConnection,
) -> Result<u64, CatalogError> {
    let skus = sqlx::query("DELETE FROM sku_drafts WHERE provider_id = $1 AND product_id = $2")
        .bind(provider_id)
        .bind(product_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    sqlx::query("DELETE FROM product_drafts WHERE provider_id = $1 AND id = $2")
        .bind(provider_id)
        .bind(product_id)
        .execute(conn)
        .await?;
    debug!("🗃️ Draft {provider_id}/{product_id} and {skus} SKU drafts deleted");
    Ok(skus)
}
