use thiserror::Error;

use crate::{
    db_types::{ActorId, NewOrder, Order, OrderId, PaymentStatus, PaymentUpdate, ProviderId},
    traits::{InsertOrderResult, TransitionResult},
};

#[derive(Debug, Clone, Error)]
pub enum OrderLedgerError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {order_id} has payment status {status}, which is not one of the expected statuses")]
    UnexpectedStatus { order_id: OrderId, status: PaymentStatus },
    #[error("Order {order_id} cannot move from {from} to {to}")]
    IllegalTransition { order_id: OrderId, from: PaymentStatus, to: PaymentStatus },
    #[error("Order {0} was modified by another transaction")]
    WriteConflict(OrderId),
    #[error("The ledger is inconsistent. {0}")]
    Corrupted(String),
    #[error("Could not store order data: {0}")]
    InvalidData(String),
}

impl From<sqlx::Error> for OrderLedgerError {
    fn from(e: sqlx::Error) -> Self {
        OrderLedgerError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for OrderLedgerError {
    fn from(e: serde_json::Error) -> Self {
        OrderLedgerError::InvalidData(e.to_string())
    }
}

/// The order ledger keeps the buyer-scoped and the provider-scoped copies of every order in lock-step.
///
/// `insert_order` and `apply_transition` are the only ways to write an order. Both touch the two copies inside a
/// single transaction, so a reader can never observe one copy ahead of the other.
#[allow(async_fn_in_trait)]
pub trait OrderLedger: Clone {
    /// Stores a new order in both the buyer's and the provider's collections.
    ///
    /// This call is idempotent on the order id. If the order already exists, the stored order is returned untouched.
    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, OrderLedgerError>;

    /// Atomically moves an order to a new payment state.
    ///
    /// Within one transaction, the ledger
    /// * reads the provider copy (`OrderNotFound` if absent), then the buyer copy it points to,
    /// * checks that the current payment status is one of `expected` (`UnexpectedStatus` if not, and nothing is
    ///   written),
    /// * calls `mutation` with the current order to obtain the new payment fields,
    /// * writes both copies with a single server-assigned `updated_at`, guarded by the status it read.
    ///
    /// A concurrent transition on the same order makes exactly one of the two fail with `WriteConflict` or
    /// `UnexpectedStatus`.
    async fn apply_transition<F>(
        &self,
        order_id: &OrderId,
        provider_id: &ProviderId,
        expected: &[PaymentStatus],
        mutation: F,
    ) -> Result<TransitionResult, OrderLedgerError>
    where
        F: FnOnce(&Order) -> PaymentUpdate + Send;

    /// Fetches the provider-scoped copy of the order.
    async fn fetch_order_for_provider(
        &self,
        order_id: &OrderId,
        provider_id: &ProviderId,
    ) -> Result<Option<Order>, OrderLedgerError>;

    /// Fetches the buyer-scoped copy of the order.
    async fn fetch_order_for_buyer(
        &self,
        order_id: &OrderId,
        buyer_id: &ActorId,
    ) -> Result<Option<Order>, OrderLedgerError>;
}
