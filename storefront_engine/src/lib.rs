//! Storefront Engine
//!
//! The storefront engine is the commerce core behind a multi-seller storefront. It keeps orders, moves their payments
//! through the payment processor, shares revenue with intermediaries, and manages the product catalog.
//!
//! The library is divided into these main sections:
//! 1. Storage contracts ([`mod@traits`]) and the SQLite backend that implements them. Callers should never need to
//!    touch the database directly. The data types stored in it live in [`mod@db_types`] and are public.
//! 2. Payment processor contracts ([`mod@processor`]). The Stripe client in `stripe_tools` implements them when the
//!    `stripe` feature is enabled.
//! 3. The public API (`sfe_api`). This is where the business rules live: the order ledger's payment transitions, the
//!    revenue split, the publish workflow, catalog edits, inventory sync and payout accounts.
//!
//! The engine also publishes events when SKUs are written and when an order's payment status changes. Register
//! handlers through [`events::EventHooks`] to act on them; the inventory sync is wired up this way.
mod sfe_api;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod processor;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
pub use sfe_api::{
    auth_context::{AuthContext, PermissionGuard},
    catalog_api::CatalogApi,
    errors::{self as api_errors, CommerceError},
    inventory_sync_api::{InventorySyncApi, SyncOutcome},
    order_history_api::OrderHistoryApi,
    payment_flow_api::{ConfirmResult, PaymentFlowApi},
    payout_api::PayoutAccountApi,
    publish_api::PublishApi,
    revenue_split::{RevenueSplit, TransferOutcome, DEFAULT_SPLIT_PERCENT},
};
