//! # Payment processor contracts
//!
//! The engine never talks to the payment processor directly. It calls through [`PaymentProcessor`] for money movement
//! and [`CatalogMirror`] for keeping the processor's catalog in step with live SKUs. [`stripe_tools::StripeApi`]
//! implements both when the `stripe` feature is enabled.
mod errors;
mod objects;
#[cfg(feature = "stripe")]
mod stripe;

use serde_json::Value;

pub use errors::{ExternalOutcome, FailureClass, ProcessorError, ProcessorErrorBody, RESOURCE_MISSING};
pub use objects::{CatalogItem, TransferReceipt, TransferRequest};

/// Money movement operations. Every mutating call carries an idempotency key, so retrying a call with the same key
/// never repeats its side effect.
#[allow(async_fn_in_trait)]
pub trait PaymentProcessor {
    /// Confirms (captures) a payment intent and returns the processor's payment intent object.
    async fn confirm_payment(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, ProcessorError>;

    /// Cancels a payment intent that has not been captured yet.
    async fn cancel_payment(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, ProcessorError>;

    /// Refunds the full captured amount of a payment intent.
    async fn refund_payment(&self, payment_intent_id: &str, idempotency_key: &str) -> Result<Value, ProcessorError>;

    async fn create_transfer(
        &self,
        transfer: &TransferRequest,
        idempotency_key: &str,
    ) -> Result<TransferReceipt, ProcessorError>;

    /// Attaches a bank account or card to a payout account. `details` are passed through untouched.
    async fn create_external_account(&self, account_id: &str, details: &Value) -> Result<Value, ProcessorError>;

    async fn retrieve_balance(&self, account_id: &str) -> Result<Value, ProcessorError>;
}

/// The processor-side copy of the live catalog.
#[allow(async_fn_in_trait)]
pub trait CatalogMirror {
    async fn create_catalog_item(&self, item: &CatalogItem) -> Result<Value, ProcessorError>;

    async fn update_catalog_item(&self, item: &CatalogItem) -> Result<Value, ProcessorError>;
}
