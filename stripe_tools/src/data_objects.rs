use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parameters for `POST /transfers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTransfer {
    pub amount: i64,
    pub currency: String,
    /// The connected account receiving the funds
    pub destination: String,
    pub transfer_group: String,
    pub description: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub destination: Option<String>,
    #[serde(default)]
    pub transfer_group: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuInventory {
    #[serde(rename = "type")]
    pub inventory_type: String,
    pub quantity: Option<i64>,
}

impl SkuInventory {
    pub fn finite(quantity: i64) -> Self {
        Self { inventory_type: "finite".to_string(), quantity: Some(quantity) }
    }
}

/// Parameters for `POST /skus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSku {
    pub id: String,
    pub product: String,
    pub inventory: SkuInventory,
    pub currency: String,
    pub price: i64,
    pub active: bool,
    pub metadata: BTreeMap<String, String>,
}

/// Parameters for `POST /skus/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkuUpdate {
    pub inventory: SkuInventory,
    pub currency: String,
    pub price: i64,
    pub active: bool,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAmount {
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(default)]
    pub available: Vec<BalanceAmount>,
    #[serde(default)]
    pub pending: Vec<BalanceAmount>,
    #[serde(default)]
    pub livemode: bool,
}
