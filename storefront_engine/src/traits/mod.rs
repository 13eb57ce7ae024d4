//! # Storage backend contracts
//!
//! The traits in this module define what a storage backend must provide for the storefront engine to run on top of
//! it. [`crate::SqliteDatabase`] implements all of them.
//!
//! * [`OrderLedger`] owns the only write paths for orders. Every order is kept twice, once in the buyer's history and
//!   once in the provider's book, and the ledger guarantees that both copies change together or not at all.
//! * [`OrderQueries`] provides read-only views over orders for history pages and provider order lists.
//! * [`CatalogManagement`] stores products and SKUs, their drafts, and performs the atomic draft promotion.
//! * [`AccountManagement`] maps actors to the processor accounts that receive their payouts.
//! * [`PermissionManagement`] stores which operators may act for which provider, and at what level.
//! * [`StorefrontDatabase`] bundles all of the above for the HTTP layer.
mod account_management;
mod catalog_management;
mod data_objects;
mod order_ledger;
mod order_queries;
mod permission_management;
mod storefront_database;

pub use account_management::{AccountApiError, AccountManagement};
pub use catalog_management::{CatalogError, CatalogManagement};
pub use data_objects::{DraftPublication, InsertOrderResult, OrderQueryFilter, SkuWrite, TransitionResult};
pub use order_ledger::{OrderLedger, OrderLedgerError};
pub use order_queries::OrderQueries;
pub use permission_management::PermissionManagement;
pub use storefront_database::StorefrontDatabase;
