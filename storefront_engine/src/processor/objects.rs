use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::db_types::{Amount, Sku};

/// A payout of part of an order's revenue to an intermediary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub amount: Amount,
    pub currency: String,
    /// The processor account that receives the funds
    pub destination: String,
    pub transfer_group: String,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub id: String,
    pub amount: Amount,
    pub destination: Option<String>,
}

/// The processor's view of a live SKU. It is keyed by the SKU id and points back at the records it mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub product: String,
    pub inventory: i64,
    pub price: Amount,
    pub currency: String,
    pub active: bool,
    pub metadata: BTreeMap<String, String>,
}

impl From<&Sku> for CatalogItem {
    fn from(sku: &Sku) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("sku_path".to_string(), sku.path().to_string());
        metadata.insert("product_path".to_string(), sku.product_path().to_string());
        Self {
            id: sku.id.clone(),
            product: sku.product_id.clone(),
            inventory: sku.inventory,
            price: sku.price,
            currency: sku.currency.clone(),
            active: sku.is_available,
            metadata,
        }
    }
}
