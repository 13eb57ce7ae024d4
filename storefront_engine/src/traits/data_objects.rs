use serde::{Deserialize, Serialize};

use crate::db_types::{DeliveryStatus, Order, PaymentStatus, Product, SalesMethod, Sku};

/// Result of an idempotent order insert.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOrderResult {
    Inserted(Order),
    AlreadyExists(Order),
}

impl InsertOrderResult {
    pub fn order(&self) -> &Order {
        match self {
            InsertOrderResult::Inserted(o) | InsertOrderResult::AlreadyExists(o) => o,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            InsertOrderResult::Inserted(o) | InsertOrderResult::AlreadyExists(o) => o,
        }
    }

    pub fn was_inserted(&self) -> bool {
        matches!(self, InsertOrderResult::Inserted(_))
    }
}

/// A committed payment transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    pub previous_status: PaymentStatus,
    pub order: Order,
}

/// A live SKU write, and whether it created the record or replaced an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuWrite {
    pub sku: Sku,
    pub created: bool,
}

/// Outcome of promoting a draft product to the live catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftPublication {
    Published { product: Product, skus: Vec<SkuWrite> },
    /// The draft exists, but has no SKUs. Nothing was written.
    NoSkus,
}

/// Filters for provider order lists. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub payment_status: Option<PaymentStatus>,
    pub delivery_status: Option<DeliveryStatus>,
    pub sales_method: Option<SalesMethod>,
}

impl OrderQueryFilter {
    pub fn with_payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = Some(status);
        self
    }

    pub fn with_delivery_status(mut self, status: DeliveryStatus) -> Self {
        self.delivery_status = Some(status);
        self
    }

    pub fn with_sales_method(mut self, method: SalesMethod) -> Self {
        self.sales_method = Some(method);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.payment_status.is_none() && self.delivery_status.is_none() && self.sales_method.is_none()
    }
}
