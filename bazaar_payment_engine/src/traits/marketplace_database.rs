use crate::traits::{InventoryManagement, NotificationStore, OrderStore, StoreError, TxMetadataStore};

/// The complete set of behaviour a backend must offer to drive the transaction reconciler.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase: Clone + OrderStore + InventoryManagement + TxMetadataStore + NotificationStore {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Closes all connections. The database must not be used afterwards.
    async fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
