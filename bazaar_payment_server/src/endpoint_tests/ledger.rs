use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bazaar_payment_engine::{
    contract::PaymentMethod,
    currency::{CurrencyDefinition, CurrencyValue},
    db_types::{Amount, OrderId, OrderRecord, OrderState, Role, TransactionRecord},
    notifications::{Notification, PaymentNotification},
    test_utils::fixtures::contract,
    traits::StoreError,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;

use super::{
    helpers::get_request,
    mocks::{MockNotifications, MockOrders},
};
use crate::routes::{LedgerRoute, NotificationsRoute};

fn sale_record() -> OrderRecord {
    let mut record = TransactionRecord::new("tx1", 0, Amount::from(60), "s_addr");
    record.timestamp = Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap();
    OrderRecord {
        order_id: OrderId("order1".into()),
        payment_address: "s_addr".into(),
        contract: contract(PaymentMethod::Direct, 100, "s_addr"),
        state: OrderState::AwaitingPayment,
        funded: false,
        records: vec![record],
        created_at: Utc.with_ymd_and_hms(2024, 10, 1, 11, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 10, 1, 12, 0, 0).unwrap(),
    }
}

fn configure_orders(cfg: &mut ServiceConfig) {
    let mut orders = MockOrders::new();
    orders.expect_fetch_order_by_id().returning(|role, id| match (role, id.as_str()) {
        (Role::Sale, "order1") => Ok(Some(sale_record())),
        (_, "broken") => Err(StoreError::DatabaseError("connection reset".into())),
        _ => Ok(None),
    });
    cfg.service(LedgerRoute::<MockOrders>::new()).app_data(web::Data::new(orders));
}

#[actix_web::test]
async fn fetch_sale_ledger() {
    let _ = env_logger::try_init();
    let (status, body) = get_request("/ledger/sale/order1", configure_orders).await.expect("Failed to make request");
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["order_id"], "order1");
    assert_eq!(json["state"], "AWAITING_PAYMENT");
    assert_eq!(json["funded"], false);
    assert_eq!(json["required"], 100);
    assert_eq!(json["total"], 60);
    assert_eq!(json["records"][0]["txid"], "tx1");
}

#[actix_web::test]
async fn role_names_are_forgiving() {
    let (status, _) = get_request("/ledger/Sales/order1", configure_orders).await.expect("Failed to make request");
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn missing_order_is_404() {
    let (status, body) = get_request("/ledger/purchase/order1", configure_orders).await.expect("Failed to make request");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No purchase with id order1"));
}

#[actix_web::test]
async fn unknown_role_is_400() {
    let (status, body) = get_request("/ledger/refund/order1", configure_orders).await.expect("Failed to make request");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid role"));
}

#[actix_web::test]
async fn backend_failure_is_500() {
    let (status, _) = get_request("/ledger/sale/broken", configure_orders).await.expect("Failed to make request");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn fetch_notifications() {
    let configure = |cfg: &mut ServiceConfig| {
        let mut store = MockNotifications::new();
        store.expect_fetch_notifications().returning(|id| {
            let btc = CurrencyDefinition::unknown("BTC");
            let n = PaymentNotification::new(id.clone(), "tx1", CurrencyValue::new(Amount::from(60), btc));
            Ok(vec![Notification::from(n)])
        });
        cfg.service(NotificationsRoute::<MockNotifications>::new()).app_data(web::Data::new(store));
    };
    let (status, body) = get_request("/notifications/order1", configure).await.expect("Failed to make request");
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json[0]["type"], "payment");
    assert_eq!(json[0]["orderId"], "order1");
    assert_eq!(json[0]["txid"], "tx1");
}
