//! A thin, typed client for the subset of the Stripe REST API that the storefront needs: payment intents, refunds,
//! transfers, catalog SKUs, connected-account external accounts and balances.
//!
//! Every mutating call takes an idempotency key, which is sent in the `Idempotency-Key` header.
mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::{Balance, BalanceAmount, NewSku, NewTransfer, SkuInventory, SkuUpdate, Transfer};
pub use error::{StripeApiError, StripeError};
