use serde::{Deserialize, Serialize};

use crate::db_types::{Order, PaymentStatus, Sku};

/// A live SKU was written for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuCreatedEvent {
    pub sku: Sku,
}

impl SkuCreatedEvent {
    pub fn new(sku: Sku) -> Self {
        Self { sku }
    }
}

/// An existing live SKU was replaced by a seller edit or a publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuUpdatedEvent {
    pub sku: Sku,
}

impl SkuUpdatedEvent {
    pub fn new(sku: Sku) -> Self {
        Self { sku }
    }
}

/// An order's payment status changed. Published after the ledger transaction commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPaymentChangedEvent {
    pub old_status: PaymentStatus,
    pub order: Order,
}

impl OrderPaymentChangedEvent {
    pub fn new(old_status: PaymentStatus, order: Order) -> Self {
        Self { old_status, order }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventType {
    SkuCreated(SkuCreatedEvent),
    SkuUpdated(SkuUpdatedEvent),
    OrderPaymentChanged(OrderPaymentChangedEvent),
}
