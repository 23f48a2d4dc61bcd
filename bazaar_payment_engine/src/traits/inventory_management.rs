use crate::traits::StoreError;

/// Stock levels, keyed by listing slug and variant index.
///
/// A count of [`UNLIMITED_INVENTORY`](crate::db_types::UNLIMITED_INVENTORY) means the variant is not tracked.
#[allow(async_fn_in_trait)]
pub trait InventoryManagement {
    /// Returns `None` when no count is stored for the variant.
    async fn fetch_inventory(&self, slug: &str, variant: i64) -> Result<Option<i64>, StoreError>;

    async fn update_inventory(&self, slug: &str, variant: i64, count: i64) -> Result<(), StoreError>;
}
