//! `SqliteDatabase` is a concrete implementation of a Bazaar Payment Engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`] module.
//!
//! [`traits`]: crate::traits
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{db_url, inventory, new_pool, notifications, orders, tx_metadata};
use crate::{
    contract::Contract,
    db_types::{FundingUpdate, NewOrderRecord, OrderId, OrderRecord, OrderState, Role, TransactionRecord, TxMetadata},
    notifications::Notification,
    traits::{
        AddressMatch,
        InventoryManagement,
        MarketplaceDatabase,
        NotificationStore,
        OrderStore,
        StoreError,
        TxMetadataStore,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database named by `BPG_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool for {url}");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Migration failed: {e}")))?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}

impl OrderStore for SqliteDatabase {
    async fn fetch_order_by_payment_address(
        &self,
        role: Role,
        address: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_payment_address(role, address, &mut conn).await
    }

    async fn fetch_order_by_id(&self, role: Role, order_id: &OrderId) -> Result<Option<OrderRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_id(role, order_id, &mut conn).await
    }

    async fn insert_order(&self, role: Role, order: NewOrderRecord) -> Result<OrderRecord, StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(role, order, &mut conn).await
    }

    async fn update_funding(
        &self,
        role: Role,
        order_id: &OrderId,
        funded: bool,
        records: &[TransactionRecord],
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_funding(role, order_id, funded, records, &mut conn).await
    }

    async fn update_order(
        &self,
        role: Role,
        order_id: &OrderId,
        contract: &Contract,
        state: OrderState,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order(role, order_id, contract, state, &mut conn).await
    }

    /// Writes the ledger, the funded flag and any state or contract change in a single transaction.
    async fn apply_funding_update(&self, role: Role, update: &FundingUpdate) -> Result<OrderRecord, StoreError> {
        let mut tx = self.pool.begin().await?;
        let current = orders::fetch_order_by_id(role, &update.order_id, &mut tx)
            .await?
            .ok_or_else(|| StoreError::OrderNotFound(role, update.order_id.clone()))?;
        if update.new_state.is_some() || update.contract.is_some() {
            let contract = update.contract.as_ref().unwrap_or(&current.contract);
            let state = update.new_state.unwrap_or(current.state);
            orders::update_order(role, &update.order_id, contract, state, &mut tx).await?;
        }
        orders::update_funding(role, &update.order_id, update.funded, &update.records, &mut tx).await?;
        let updated = orders::fetch_order_by_id(role, &update.order_id, &mut tx)
            .await?
            .ok_or_else(|| StoreError::OrderNotFound(role, update.order_id.clone()))?;
        tx.commit().await?;
        debug!("🗃️ Funding update for {role} {} committed", update.order_id);
        Ok(updated)
    }

    /// Both views are read inside one transaction, so the answer reflects a single snapshot of the store.
    async fn resolve_payment_address(&self, address: &str) -> Result<AddressMatch, StoreError> {
        let mut tx = self.pool.begin().await?;
        let sale = orders::fetch_order_by_payment_address(Role::Sale, address, &mut tx).await?;
        let purchase = orders::fetch_order_by_payment_address(Role::Purchase, address, &mut tx).await?;
        tx.commit().await?;
        match (sale, purchase) {
            (Some(_), Some(_)) => {
                error!("🗃️ Address {address} is the payment address of both a sale and a purchase");
                Err(StoreError::AddressConflict(address.to_string()))
            },
            (Some(o), None) => Ok(AddressMatch::Sale(o)),
            (None, Some(o)) => Ok(AddressMatch::Purchase(o)),
            (None, None) => Ok(AddressMatch::NotFound),
        }
    }
}

impl InventoryManagement for SqliteDatabase {
    async fn fetch_inventory(&self, slug: &str, variant: i64) -> Result<Option<i64>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        inventory::fetch_inventory(slug, variant, &mut conn).await
    }

    async fn update_inventory(&self, slug: &str, variant: i64, count: i64) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        inventory::upsert_inventory(slug, variant, count, &mut conn).await
    }
}

impl TxMetadataStore for SqliteDatabase {
    async fn save_tx_metadata(&self, metadata: &TxMetadata) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        tx_metadata::upsert_tx_metadata(metadata, &mut conn).await
    }

    async fn fetch_tx_metadata(&self, txid: &str) -> Result<Option<TxMetadata>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        tx_metadata::fetch_tx_metadata(txid, &mut conn).await
    }
}

impl NotificationStore for SqliteDatabase {
    async fn save_notification(&self, notification: &Notification) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        notifications::insert_notification(notification, &mut conn).await
    }

    async fn fetch_notifications(&self, order_id: &OrderId) -> Result<Vec<Notification>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        notifications::fetch_notifications_for_order(order_id, &mut conn).await
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}
