use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Type};
use thiserror::Error;

pub use sf_common::Amount;

use crate::helpers::DocPath;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                if s.is_empty() || s.contains('/') {
                    Err(ConversionError(format!("'{s}' is not a valid {}", stringify!($name))))
                } else {
                    Ok(Self(s.to_string()))
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(OrderId);
string_id!(ProviderId);
string_id!(ActorId);

//--------------------------------------     PaymentStatus     ---------------------------------------------------------
/// The payment state machine of an order.
///
/// `none → processing → {succeeded, payment_failed}`, `processing → canceled` and `succeeded → canceled` are the
/// only legal transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    None,
    Processing,
    Succeeded,
    PaymentFailed,
    Canceled,
}

impl PaymentStatus {
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (None, Processing) |
                (Processing, Succeeded) |
                (Processing, PaymentFailed) |
                (Processing, Canceled) |
                (Succeeded, Canceled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::None => "none",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::PaymentFailed => "payment_failed",
            PaymentStatus::Canceled => "canceled",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "processing" => Ok(Self::Processing),
            "succeeded" => Ok(Self::Succeeded),
            "payment_failed" => Ok(Self::PaymentFailed),
            "canceled" => Ok(Self::Canceled),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------     DeliveryStatus    ---------------------------------------------------------
/// Fulfilment state. Stored and searchable, but never driven by the payment flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    None,
    Pending,
    PreparingForDelivery,
    OutForDelivery,
    InTransit,
    FailedAttempt,
    Delivered,
    AvailableForPickup,
    Exception,
    Expired,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::None => "none",
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::PreparingForDelivery => "preparing_for_delivery",
            DeliveryStatus::OutForDelivery => "out_for_delivery",
            DeliveryStatus::InTransit => "in_transit",
            DeliveryStatus::FailedAttempt => "failed_attempt",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::AvailableForPickup => "available_for_pickup",
            DeliveryStatus::Exception => "exception",
            DeliveryStatus::Expired => "expired",
        }
    }
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "pending" => Ok(Self::Pending),
            "preparing_for_delivery" => Ok(Self::PreparingForDelivery),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "in_transit" => Ok(Self::InTransit),
            "failed_attempt" => Ok(Self::FailedAttempt),
            "delivered" => Ok(Self::Delivered),
            "available_for_pickup" => Ok(Self::AvailableForPickup),
            "exception" => Ok(Self::Exception),
            "expired" => Ok(Self::Expired),
            s => Err(ConversionError(format!("Invalid delivery status: {s}"))),
        }
    }
}

//--------------------------------------      SalesMethod      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SalesMethod {
    Online,
    Instore,
    Pickup,
    Download,
}

impl SalesMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalesMethod::Online => "online",
            SalesMethod::Instore => "instore",
            SalesMethod::Pickup => "pickup",
            SalesMethod::Download => "download",
        }
    }
}

impl Display for SalesMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "instore" => Ok(Self::Instore),
            "pickup" => Ok(Self::Pickup),
            "download" => Ok(Self::Download),
            s => Err(ConversionError(format!("Invalid sales method: {s}"))),
        }
    }
}

//--------------------------------------        LineItem       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_reference: String,
    pub sku_reference: String,
    pub quantity: i64,
    pub amount: Amount,
    pub currency: String,
    /// The intermediary that brokered this sale, if any. Their presence triggers a revenue split.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mediated_by: Option<ActorId>,
}

impl LineItem {
    pub fn new(sku_path: &str, quantity: i64, amount: Amount, currency: &str) -> Self {
        let product_reference = match sku_path.parse::<DocPath>() {
            Ok(DocPath::Sku { provider_id, product_id, .. }) => DocPath::Product { provider_id, product_id }.to_string(),
            _ => String::default(),
        };
        Self {
            product_reference,
            sku_reference: sku_path.to_string(),
            quantity,
            amount,
            currency: currency.to_string(),
            mediated_by: None,
        }
    }

    pub fn with_mediator(mut self, mediator: ActorId) -> Self {
        self.mediated_by = Some(mediator);
        self
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
/// One logical order. Both the buyer-scoped and the provider-scoped copies materialize as this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub purchased_by: ActorId,
    pub provided_by: ProviderId,
    pub items: Vec<LineItem>,
    pub amount: Amount,
    pub currency: String,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub sales_method: SalesMethod,
    /// The processor payment intent created at checkout
    pub payment_intent_id: Option<String>,
    /// The last object the processor returned for this order's payment
    pub payment_result: Option<Value>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// The payment intent that cancel and refund calls act on. The processor's own record wins over the reference
    /// stored at checkout.
    pub fn payment_reference(&self) -> Option<String> {
        self.payment_result
            .as_ref()
            .and_then(|r| r.get("id"))
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| self.payment_intent_id.clone())
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
/// An order as handed over by the checkout flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub id: OrderId,
    pub purchased_by: ActorId,
    pub provided_by: ProviderId,
    pub items: Vec<LineItem>,
    pub amount: Amount,
    pub currency: String,
    #[serde(default = "default_sales_method")]
    pub sales_method: SalesMethod,
    #[serde(default = "default_payment_status")]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_sales_method() -> SalesMethod {
    SalesMethod::Online
}

fn default_payment_status() -> PaymentStatus {
    PaymentStatus::Processing
}

impl NewOrder {
    pub fn new(id: OrderId, purchased_by: ActorId, provided_by: ProviderId, amount: Amount, currency: &str) -> Self {
        Self {
            id,
            purchased_by,
            provided_by,
            items: Vec::new(),
            amount,
            currency: currency.to_string(),
            sales_method: SalesMethod::Online,
            payment_status: PaymentStatus::Processing,
            payment_intent_id: None,
            tags: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_payment_intent(mut self, payment_intent_id: &str) -> Self {
        self.payment_intent_id = Some(payment_intent_id.to_string());
        self
    }

    pub fn with_payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = status;
        self
    }

    pub fn with_sales_method(mut self, method: SalesMethod) -> Self {
        self.sales_method = method;
        self
    }
}

//--------------------------------------      PaymentUpdate    ---------------------------------------------------------
/// The new payment fields that a ledger transition writes to both copies of an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentUpdate {
    pub payment_status: PaymentStatus,
    /// `None` leaves the stored result untouched
    pub payment_result: Option<Value>,
}

impl PaymentUpdate {
    pub fn new(payment_status: PaymentStatus) -> Self {
        Self { payment_status, payment_result: None }
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.payment_result = Some(result);
        self
    }
}

//--------------------------------------    Products & SKUs    ---------------------------------------------------------
/// A product. Drafts and live listings share this shape and differ only in where they are stored.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub provider_id: ProviderId,
    pub name: String,
    pub caption: String,
    pub description: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn path(&self) -> DocPath {
        DocPath::Product { provider_id: self.provider_id.clone(), product_id: self.id.clone() }
    }

    pub fn draft_path(&self) -> DocPath {
        DocPath::ProductDraft { provider_id: self.provider_id.clone(), product_id: self.id.clone() }
    }
}

/// A sellable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sku {
    pub id: String,
    pub provider_id: ProviderId,
    pub product_id: String,
    pub inventory: i64,
    pub price: Amount,
    pub currency: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sku {
    pub fn path(&self) -> DocPath {
        DocPath::Sku {
            provider_id: self.provider_id.clone(),
            product_id: self.product_id.clone(),
            sku_id: self.id.clone(),
        }
    }

    pub fn product_path(&self) -> DocPath {
        DocPath::Product { provider_id: self.provider_id.clone(), product_id: self.product_id.clone() }
    }
}

/// Seller-editable fields of a product draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub description: String,
}

/// Seller-editable fields of a SKU, draft or live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuInput {
    pub inventory: i64,
    pub price: Amount,
    pub currency: String,
    #[serde(default)]
    pub is_available: bool,
}

//--------------------------------------     PayoutAccount     ---------------------------------------------------------
/// Maps an actor to the processor account that receives their transfers.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutAccount {
    pub actor_id: ActorId,
    pub external_account_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------   Roles & Permissions ---------------------------------------------------------
/// Coarse roles carried in the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

/// What an operator may do on behalf of a provider. Each level includes the ones below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Write,
    Owner,
}

impl Permission {
    pub fn satisfies(&self, required: Permission) -> bool {
        *self >= required
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Read => f.write_str("read"),
            Permission::Write => f.write_str("write"),
            Permission::Owner => f.write_str("owner"),
        }
    }
}
