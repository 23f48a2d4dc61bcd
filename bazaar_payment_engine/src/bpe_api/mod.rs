//! # Bazaar payment engine API
//!
//! * [`transaction_reconciler`] is the primary API. It takes wallet transaction callbacks and folds them into the
//!   sale and purchase ledgers, emitting notifications as orders become funded or are paid out.
//! * [`inventory_adjuster`] decrements listing stock when a sale is funded.
//!
//! The other submodules are support types for these two.
//!
//! # API usage
//!
//! ```rust,ignore
//! use bazaar_payment_engine::{events::EventProducers, ReconcilerConfig, SqliteDatabase, TransactionReconciler};
//! let db = SqliteDatabase::new(10).await?;
//! let reconciler = TransactionReconciler::new(db, EventProducers::default(), ReconcilerConfig::default());
//! let report = reconciler.on_transaction_received(&callback).await;
//! if report.should_redeliver() {
//!     // ask the wallet to send the callback again
//! }
//! ```
pub mod config;
pub mod errors;
pub mod inventory_adjuster;
pub mod lock_shards;
pub mod reconciliation_objects;
pub mod transaction_reconciler;
