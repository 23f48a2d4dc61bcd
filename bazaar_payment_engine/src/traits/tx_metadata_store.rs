use crate::{db_types::TxMetadata, traits::StoreError};

#[allow(async_fn_in_trait)]
pub trait TxMetadataStore {
    /// Inserts or replaces the metadata for `metadata.txid`.
    async fn save_tx_metadata(&self, metadata: &TxMetadata) -> Result<(), StoreError>;

    async fn fetch_tx_metadata(&self, txid: &str) -> Result<Option<TxMetadata>, StoreError>;
}
