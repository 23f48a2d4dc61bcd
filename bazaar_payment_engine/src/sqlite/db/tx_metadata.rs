use sqlx::SqliteConnection;

use crate::{db_types::TxMetadata, traits::StoreError};

pub async fn upsert_tx_metadata(metadata: &TxMetadata, conn: &mut SqliteConnection) -> Result<(), StoreError> {
    sqlx::query(
        r#"
            INSERT INTO tx_metadata (txid, address, memo, order_id, thumbnail, can_bump_fee)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (txid) DO UPDATE SET
                address = excluded.address,
                memo = excluded.memo,
                order_id = excluded.order_id,
                thumbnail = excluded.thumbnail,
                can_bump_fee = excluded.can_bump_fee;
        "#,
    )
    .bind(&metadata.txid)
    .bind(&metadata.address)
    .bind(&metadata.memo)
    .bind(&metadata.order_id)
    .bind(&metadata.thumbnail)
    .bind(metadata.can_bump_fee)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_tx_metadata(txid: &str, conn: &mut SqliteConnection) -> Result<Option<TxMetadata>, StoreError> {
    let metadata =
        sqlx::query_as("SELECT * FROM tx_metadata WHERE txid = $1").bind(txid).fetch_optional(conn).await?;
    Ok(metadata)
}
