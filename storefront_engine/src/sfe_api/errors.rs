use serde_json::{json, Value};
use thiserror::Error;

use crate::traits::{AccountApiError, CatalogError, OrderLedgerError};

pub const INVALID_ORDER_STATUS: &str = "Invalid order status.";
pub const NO_PROVIDER_MESSAGE: &str = "Auth does not maintain a providerID.";
pub const NO_ACCOUNT_MESSAGE: &str = "Auth does not maintain a accountID.";
pub const INVALID_PATH_MESSAGE: &str = "Invalid path.";
pub const NO_SKU_MESSAGE: &str = "The product could not be published because the product does not have an SKU.";

/// Every failure an engine operation can report.
///
/// `Conflict` and `ExternalProcessorError` are expected outcomes that callers hand back to clients as an `{error}`
/// envelope (see [`CommerceError::envelope`]). Everything else is a failure of the request itself.
#[derive(Debug, Clone, Error)]
pub enum CommerceError {
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Conflict { message: String, target: Option<String> },
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{message}")]
    ExternalProcessorError { message: String, target: Option<String>, raw: Option<Value> },
    #[error("The payment processor could not complete the request. {0}")]
    UnrecognizedProcessorError(String),
    #[error("Store error: {0}")]
    StoreError(String),
}

impl CommerceError {
    pub fn invalid_order_status(order_id: impl Into<String>) -> Self {
        CommerceError::Conflict { message: INVALID_ORDER_STATUS.to_string(), target: Some(order_id.into()) }
    }

    /// The body of the `{error: ...}` envelope for expected failures, or `None` if this error is not one.
    ///
    /// Processor errors without a target are passed through to the client exactly as the processor sent them.
    pub fn envelope(&self) -> Option<Value> {
        match self {
            CommerceError::Conflict { message, target } => Some(message_and_target(message, target.as_deref())),
            CommerceError::ExternalProcessorError { raw: Some(raw), target: None, .. } => Some(raw.clone()),
            CommerceError::ExternalProcessorError { message, target, .. } => {
                Some(message_and_target(message, target.as_deref()))
            },
            _ => None,
        }
    }
}

fn message_and_target(message: &str, target: Option<&str>) -> Value {
    match target {
        Some(target) => json!({ "message": message, "target": target }),
        None => json!({ "message": message }),
    }
}

impl From<OrderLedgerError> for CommerceError {
    fn from(e: OrderLedgerError) -> Self {
        match e {
            OrderLedgerError::OrderNotFound(id) => CommerceError::NotFound(format!("The order does not exist. {id}")),
            OrderLedgerError::UnexpectedStatus { order_id, .. } |
            OrderLedgerError::IllegalTransition { order_id, .. } |
            OrderLedgerError::WriteConflict(order_id) => CommerceError::invalid_order_status(order_id.to_string()),
            e => CommerceError::StoreError(e.to_string()),
        }
    }
}

impl From<CatalogError> for CommerceError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::DraftNotFound(p) => CommerceError::NotFound(format!("Product draft {p} does not exist.")),
            CatalogError::ProductNotFound(p) => CommerceError::NotFound(format!("Product {p} does not exist.")),
            CatalogError::SkuIdTaken { sku_id, product_id } => CommerceError::InvalidArgument(format!(
                "The SKU id '{sku_id}' is already used by product {product_id} of this provider."
            )),
            e => CommerceError::StoreError(e.to_string()),
        }
    }
}

impl From<AccountApiError> for CommerceError {
    fn from(e: AccountApiError) -> Self {
        CommerceError::StoreError(e.to_string())
    }
}
