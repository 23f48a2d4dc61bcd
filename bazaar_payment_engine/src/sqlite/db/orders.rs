//! Sales and purchases.
//!
//! Both views live in tables of identical shape, selected by [`Role::table_name`]. The contract and the funding
//! ledger are stored as JSON columns and always rewritten whole.
use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{FromRow, SqliteConnection};

use crate::{
    contract::Contract,
    db_types::{NewOrderRecord, OrderId, OrderRecord, OrderState, Role, TransactionRecord},
    traits::StoreError,
};

#[derive(Debug, FromRow)]
struct OrderRow {
    order_id: String,
    payment_address: String,
    contract: String,
    state: String,
    funded: bool,
    transactions: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for OrderRecord {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let contract = serde_json::from_str(&row.contract)?;
        let records = serde_json::from_str(&row.transactions)?;
        Ok(Self {
            order_id: OrderId(row.order_id),
            payment_address: row.payment_address,
            contract,
            state: OrderState::from(row.state),
            funded: row.funded,
            records,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn to_record(row: Option<OrderRow>) -> Result<Option<OrderRecord>, StoreError> {
    row.map(OrderRecord::try_from).transpose()
}

pub async fn fetch_order_by_payment_address(
    role: Role,
    address: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderRecord>, StoreError> {
    let sql = format!("SELECT * FROM {} WHERE payment_address = $1", role.table_name());
    let row: Option<OrderRow> = sqlx::query_as(&sql).bind(address).fetch_optional(conn).await?;
    to_record(row)
}

pub async fn fetch_order_by_id(
    role: Role,
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderRecord>, StoreError> {
    let sql = format!("SELECT * FROM {} WHERE order_id = $1", role.table_name());
    let row: Option<OrderRow> = sqlx::query_as(&sql).bind(order_id.as_str()).fetch_optional(conn).await?;
    to_record(row)
}

/// Inserts a new order with an empty funding ledger. This is not atomic. You can embed this call inside a
/// transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(
    role: Role,
    order: NewOrderRecord,
    conn: &mut SqliteConnection,
) -> Result<OrderRecord, StoreError> {
    let contract = serde_json::to_string(&order.contract)?;
    let sql = format!(
        r#"
            INSERT INTO {} (order_id, payment_address, contract, state, funded, transactions, created_at, updated_at)
            VALUES ($1, $2, $3, $4, FALSE, '[]', $5, $6)
            RETURNING *;
        "#,
        role.table_name()
    );
    let order_id = order.order_id.clone();
    let now = Utc::now();
    let row: OrderRow = sqlx::query_as(&sql)
        .bind(order.order_id.as_str())
        .bind(order.payment_address)
        .bind(contract)
        .bind(order.state.to_string())
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(err) if err.is_unique_violation() => StoreError::OrderAlreadyExists(role, order_id),
            _ => StoreError::from(e),
        })?;
    debug!("🗃️ New {role} {} saved", row.order_id);
    OrderRecord::try_from(row)
}

pub async fn update_funding(
    role: Role,
    order_id: &OrderId,
    funded: bool,
    records: &[TransactionRecord],
    conn: &mut SqliteConnection,
) -> Result<(), StoreError> {
    let transactions = serde_json::to_string(records)?;
    let sql =
        format!("UPDATE {} SET funded = $1, transactions = $2, updated_at = $3 WHERE order_id = $4", role.table_name());
    let result =
        sqlx::query(&sql).bind(funded).bind(transactions).bind(Utc::now()).bind(order_id.as_str()).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::OrderNotFound(role, order_id.clone()));
    }
    trace!("🗃️ Funding for {role} {order_id} updated. {} records, funded: {funded}", records.len());
    Ok(())
}

pub async fn update_order(
    role: Role,
    order_id: &OrderId,
    contract: &Contract,
    state: OrderState,
    conn: &mut SqliteConnection,
) -> Result<(), StoreError> {
    let contract = serde_json::to_string(contract)?;
    let sql =
        format!("UPDATE {} SET contract = $1, state = $2, updated_at = $3 WHERE order_id = $4", role.table_name());
    let result = sqlx::query(&sql)
        .bind(contract)
        .bind(state.to_string())
        .bind(Utc::now())
        .bind(order_id.as_str())
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::OrderNotFound(role, order_id.clone()));
    }
    trace!("🗃️ {role} {order_id} is now {state}");
    Ok(())
}
