//! Bazaar Payment Engine
//!
//! The Bazaar Payment Engine watches the addresses that a marketplace node hands out for its sales (where it is the
//! vendor) and purchases (where it is the buyer). Whenever the wallet reports a transaction that pays into, or spends
//! from, one of those addresses, the engine updates the order's funding ledger and moves the order along its life
//! cycle.
//!
//! The library is divided into three main sections:
//! 1. Storage ([`mod@traits`] and [`mod@sqlite`]). The reconciler only talks to the store through the traits, and
//!    `SqliteDatabase` is the bundled backend. The record types are defined in [`mod@db_types`] and are public.
//! 2. The engine API ([`mod@bpe_api`]). [`TransactionReconciler`] is the entry point for wallet callbacks.
//! 3. Events ([`mod@events`]). Notifications and inventory changes are published to async hooks, so that callers can
//!    forward them to a UI, a websocket or a log without the reconciler knowing about it.
pub mod bpe_api;
pub mod contract;
pub mod currency;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod notifications;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;
pub mod wallet_types;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use bpe_api::{
    config::ReconcilerConfig,
    errors::ReconcilerError,
    inventory_adjuster::{InventoryAdjuster, InventoryAdjustment},
    reconciliation_objects::{ReconciliationReport, UnitKind, UnitOutcome, UnitRef, UnitReport},
    transaction_reconciler::TransactionReconciler,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{
    AddressMatch,
    InventoryManagement,
    MarketplaceDatabase,
    NotificationStore,
    OrderStore,
    StoreError,
    TxMetadataStore,
};
