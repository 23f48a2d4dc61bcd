use sqlx::SqliteConnection;

use crate::traits::StoreError;

pub async fn fetch_inventory(slug: &str, variant: i64, conn: &mut SqliteConnection) -> Result<Option<i64>, StoreError> {
    let count = sqlx::query_scalar("SELECT count FROM inventory WHERE slug = $1 AND variant = $2")
        .bind(slug)
        .bind(variant)
        .fetch_optional(conn)
        .await?;
    Ok(count)
}

pub async fn upsert_inventory(
    slug: &str,
    variant: i64,
    count: i64,
    conn: &mut SqliteConnection,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
            INSERT INTO inventory (slug, variant, count) VALUES ($1, $2, $3)
            ON CONFLICT (slug, variant) DO UPDATE SET count = excluded.count;
        "#,
    )
    .bind(slug)
    .bind(variant)
    .bind(count)
    .execute(conn)
    .await?;
    Ok(())
}
