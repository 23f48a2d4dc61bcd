//! # Bazaar payment server
//! This crate hosts the HTTP front end for the Bazaar payment engine. It is responsible for:
//! * Accepting transaction callbacks from the marketplace wallet and running them through the
//!   [`TransactionReconciler`](bazaar_payment_engine::TransactionReconciler).
//! * Exposing read-only views of order ledgers and the notifications they produced.
//! * Logging the notification stream.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/wallet/transaction`: Wallet callbacks. Responds with the reconciliation report.
//! * `/ledger/{role}/{order_id}`: The funding ledger of a sale or purchase.
//! * `/notifications/{order_id}`: Notifications that were emitted for an order.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
