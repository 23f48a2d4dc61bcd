//! # Store interfaces
//!
//! The reconciler owns no storage. Everything it reads or writes goes through the traits in this module, so any
//! backend that implements them can sit behind it. The crate ships a SQLite backend.
//!
//! * [`OrderStore`] holds the sale and purchase views of every contract, along with each order's funding ledger.
//! * [`InventoryManagement`] tracks stock counts per listing variant.
//! * [`TxMetadataStore`] keeps display metadata for wallet transactions.
//! * [`NotificationStore`] keeps a copy of every notification that was broadcast.
//! * [`MarketplaceDatabase`] ties them together.
mod errors;
mod inventory_management;
mod marketplace_database;
mod notification_store;
mod order_store;
mod tx_metadata_store;

pub use errors::StoreError;
pub use inventory_management::InventoryManagement;
pub use marketplace_database::MarketplaceDatabase;
pub use notification_store::NotificationStore;
pub use order_store::{AddressMatch, OrderStore};
pub use tx_metadata_store::TxMetadataStore;
