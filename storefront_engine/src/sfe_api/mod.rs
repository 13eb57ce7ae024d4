//! # Storefront engine public API
//!
//! The `sfe_api` module exposes the programmatic API of the storefront engine. Each API is generic over the storage
//! traits it needs (and the processor traits, where it talks to the payment processor), so a caller only has to supply
//! what that API actually uses.
//!
//! * [`payment_flow_api`] confirms, cancels and refunds order payments and pays out the revenue split.
//! * [`publish_api`] promotes product drafts to the live catalog.
//! * [`catalog_api`] handles seller edits of drafts and live SKUs.
//! * [`inventory_sync_api`] mirrors live SKUs to the processor catalog. It is meant to be driven by the SKU event hooks.
//! * [`payout_api`] manages payout accounts and their external bank accounts.
//! * [`order_history_api`] gives buyers and providers read access to their orders.
//!
//! Every operation takes an explicit [`AuthContext`](auth_context::AuthContext) describing the caller.
//!
//! # API usage
//!
//! ```rust,ignore
//! use storefront_engine::{AuthContext, PaymentFlowApi, SqliteDatabase, events::EventProducers};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = PaymentFlowApi::new(db, stripe_api, EventProducers::default());
//! let ctx = AuthContext::new("seller".into()).with_provider("p1".into());
//! let result = api.confirm(&ctx, "o1", "pi_1").await?;
//! ```

pub mod auth_context;
pub mod catalog_api;
pub mod errors;
pub mod inventory_sync_api;
pub mod order_history_api;
pub mod payment_flow_api;
pub mod payout_api;
pub mod publish_api;
pub mod revenue_split;
