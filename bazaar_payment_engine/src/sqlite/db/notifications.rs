use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{db_types::OrderId, notifications::Notification, traits::StoreError};

/// Saves the notification as JSON. Re-saving an existing notification id changes nothing.
pub async fn insert_notification(notification: &Notification, conn: &mut SqliteConnection) -> Result<(), StoreError> {
    let payload = serde_json::to_string(notification)?;
    sqlx::query(
        r#"
            INSERT INTO notifications (id, order_id, notification_type, payload, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING;
        "#,
    )
    .bind(notification.notification_id())
    .bind(notification.order_id().as_str())
    .bind(notification.notification_type())
    .bind(payload)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_notifications_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, StoreError> {
    let payloads: Vec<String> =
        sqlx::query_scalar("SELECT payload FROM notifications WHERE order_id = $1 ORDER BY created_at, rowid")
            .bind(order_id.as_str())
            .fetch_all(conn)
            .await?;
    payloads.iter().map(|p| serde_json::from_str(p).map_err(StoreError::from)).collect()
}
