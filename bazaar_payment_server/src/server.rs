use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use bazaar_payment_engine::{
    events::{EventHandlers, EventHooks, InventoryUpdatedEvent, NotificationEvent},
    SqliteDatabase,
    TransactionReconciler,
};
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{health, LedgerRoute, NotificationsRoute, WalletTransactionRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_db_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let handlers = EventHandlers::new(config.reconciler.event_buffer_size, create_event_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let reconciler = TransactionReconciler::new(db.clone(), producers, config.reconciler.clone());
    info!("🚀️ {reconciler:?} ready");
    let srv = create_server_instance(config, db, reconciler)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// The reconciler is shared by every worker, so that all of them contend for the same lock stripes.
pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    reconciler: TransactionReconciler<SqliteDatabase>,
) -> Result<Server, ServerError> {
    let reconciler = web::Data::new(reconciler);
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bps::access_log"))
            .app_data(reconciler.clone())
            .app_data(web::Data::new(db.clone()))
            .service(health)
            .service(WalletTransactionRoute::<SqliteDatabase>::new())
            .service(LedgerRoute::<SqliteDatabase>::new())
            .service(NotificationsRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Notifications and inventory changes are logged. A UI bridge would subscribe here.
pub fn create_event_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks.on_notification(|ev: NotificationEvent| {
        Box::pin(async move {
            let n = &ev.notification;
            match serde_json::to_string(n) {
                Ok(json) => info!("📬️ {} notification for {}: {json}", n.notification_type(), n.order_id()),
                Err(e) => warn!("📬️ Could not serialize {} notification. {e}", n.notification_type()),
            }
        })
    });
    hooks.on_inventory_updated(|ev: InventoryUpdatedEvent| {
        Box::pin(async move {
            let slugs = ev.slugs().join(", ");
            info!("📬️ Inventory changed for {slugs} after order {}. Listings need republishing.", ev.order_id);
        })
    });
    hooks
}
