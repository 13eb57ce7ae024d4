//! # Storefront server
//! This crate hosts the HTTP gateway for the storefront engine. It is responsible for:
//! * Verifying the caller's access token and turning its claims into an authorization context.
//! * Exposing the order payment, catalog and payout operations under `/api`.
//! * Wiring the engine's SKU events to the payment processor's catalog, so live SKUs stay mirrored.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/...`: Everything else. See [routes](routes/index.html).

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
