use serde::{Deserialize, Serialize};

use crate::{db_types::OrderId, notifications::Notification};

/// A notification is ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub notification: Notification,
}

impl NotificationEvent {
    pub fn new(notification: Notification) -> Self {
        Self { notification }
    }
}

/// A stock level changed for one or more SKUs of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUpdatedEvent {
    pub order_id: OrderId,
    pub changes: Vec<InventoryChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryChange {
    pub slug: String,
    pub variant: i64,
    pub old_count: i64,
    pub new_count: i64,
}

impl InventoryUpdatedEvent {
    pub fn new(order_id: OrderId, changes: Vec<InventoryChange>) -> Self {
        Self { order_id, changes }
    }

    /// The distinct listings whose published inventory is now stale.
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs = self.changes.iter().map(|c| c.slug.as_str()).collect::<Vec<_>>();
        slugs.sort_unstable();
        slugs.dedup();
        slugs
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    Notification(NotificationEvent),
    InventoryUpdated(InventoryUpdatedEvent),
}
