//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Store access and reconciliation are all async, so the handlers here
//! only ever yield.
use actix_web::{get, web, HttpResponse, Responder};
use bazaar_payment_engine::{
    db_types::{OrderId, Role},
    wallet_types::TransactionCallback,
    MarketplaceDatabase,
    NotificationStore,
    OrderStore,
    TransactionReconciler,
};
use log::*;

use crate::{data_objects::LedgerView, errors::ServerError};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Wallet  ----------------------------------------------------
route!(wallet_transaction => Post "/wallet/transaction" impl MarketplaceDatabase);
/// Route handler for wallet transaction callbacks
///
/// The body is a JSON [`TransactionCallback`]. Every output and input is reconciled and the response is the
/// reconciliation report. The status is always 200 once the body has been parsed; the wallet should inspect the
/// report and deliver the callback again if any unit failed with `"retryable": true`.
pub async fn wallet_transaction<B: MarketplaceDatabase>(
    body: web::Bytes,
    api: web::Data<TransactionReconciler<B>>,
) -> Result<HttpResponse, ServerError> {
    let callback = serde_json::from_slice::<TransactionCallback>(&body).map_err(|e| {
        debug!("💻️ Could not deserialize transaction callback. {e}");
        ServerError::CouldNotDeserializePayload(e.to_string())
    })?;
    debug!("💻️ POST wallet transaction {}", callback.txid);
    let report = api.on_transaction_received(&callback).await;
    Ok(HttpResponse::Ok().json(report))
}

//----------------------------------------------   Ledger  ----------------------------------------------------
route!(ledger => Get "/ledger/{role}/{order_id}" impl OrderStore);
pub async fn ledger<B: OrderStore>(
    path: web::Path<(String, String)>,
    db: web::Data<B>,
) -> Result<HttpResponse, ServerError> {
    let (role, order_id) = path.into_inner();
    let role = role.parse::<Role>().map_err(|e| ServerError::InvalidRequestPath(e.to_string()))?;
    let order_id = OrderId::from(order_id);
    debug!("💻️ GET ledger for {role} {order_id}");
    let order = db
        .fetch_order_by_id(role, &order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No {role} with id {order_id}")))?;
    Ok(HttpResponse::Ok().json(LedgerView::new(role, order)))
}

//----------------------------------------------   Notifications  ----------------------------------------------
route!(notifications => Get "/notifications/{order_id}" impl NotificationStore);
pub async fn notifications<B: NotificationStore>(
    path: web::Path<String>,
    db: web::Data<B>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ GET notifications for {order_id}");
    let notifications = db.fetch_notifications(&order_id).await?;
    Ok(HttpResponse::Ok().json(notifications))
}
