use crate::{db_types::OrderId, notifications::Notification, traits::StoreError};

#[allow(async_fn_in_trait)]
pub trait NotificationStore {
    /// Persists a broadcast notification. Saving the same notification id twice is a no-op.
    async fn save_notification(&self, notification: &Notification) -> Result<(), StoreError>;

    /// All stored notifications for the order, oldest first.
    async fn fetch_notifications(&self, order_id: &OrderId) -> Result<Vec<Notification>, StoreError>;
}
