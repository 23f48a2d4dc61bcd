use bazaar_payment_engine::{
    contract::Contract,
    db_types::{NewOrderRecord, OrderId, OrderRecord, OrderState, Role, TransactionRecord},
    notifications::Notification,
    traits::{NotificationStore, OrderStore, StoreError},
};
use mockall::mock;

mock! {
    pub Orders {}
    impl OrderStore for Orders {
        async fn fetch_order_by_payment_address(&self, role: Role, address: &str) -> Result<Option<OrderRecord>, StoreError>;
        async fn fetch_order_by_id(&self, role: Role, order_id: &OrderId) -> Result<Option<OrderRecord>, StoreError>;
        async fn insert_order(&self, role: Role, order: NewOrderRecord) -> Result<OrderRecord, StoreError>;
        async fn update_funding(&self, role: Role, order_id: &OrderId, funded: bool, records: &[TransactionRecord]) -> Result<(), StoreError>;
        async fn update_order(&self, role: Role, order_id: &OrderId, contract: &Contract, state: OrderState) -> Result<(), StoreError>;
    }
}

mock! {
    pub Notifications {}
    impl NotificationStore for Notifications {
        async fn save_notification(&self, notification: &Notification) -> Result<(), StoreError>;
        async fn fetch_notifications(&self, order_id: &OrderId) -> Result<Vec<Notification>, StoreError>;
    }
}
