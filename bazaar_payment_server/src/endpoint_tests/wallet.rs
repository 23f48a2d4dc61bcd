use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bazaar_payment_engine::{
    contract::PaymentMethod,
    db_types::{OrderState, Role},
    events::EventProducers,
    test_utils::{
        fixtures::{contract, insert_order},
        prepare_env::fresh_database,
    },
    ReconcilerConfig,
    ReconciliationReport,
    SqliteDatabase,
    TransactionReconciler,
    UnitOutcome,
};

use super::helpers::post_request;
use crate::routes::WalletTransactionRoute;

async fn reconciler() -> web::Data<TransactionReconciler<SqliteDatabase>> {
    let db = fresh_database().await;
    insert_order(&db, Role::Purchase, contract(PaymentMethod::Direct, 100, "p_addr"), OrderState::AwaitingPayment).await;
    web::Data::new(TransactionReconciler::new(db, EventProducers::default(), ReconcilerConfig::default()))
}

fn configure(api: web::Data<TransactionReconciler<SqliteDatabase>>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.service(WalletTransactionRoute::<SqliteDatabase>::new()).app_data(api);
    }
}

const CALLBACK: &str = r#"{
    "txid": "tx1",
    "outputs": [
        {"address": "p_addr", "value": 100, "index": 0},
        {"address": "change", "value": 5, "index": 1}
    ]
}"#;

#[actix_web::test]
async fn wallet_callback_returns_report() {
    let _ = env_logger::try_init();
    let api = reconciler().await;
    let (status, body) =
        post_request("/wallet/transaction", CALLBACK, configure(api.clone())).await.expect("Failed to make request");
    assert_eq!(status, StatusCode::OK);
    let report: ReconciliationReport = serde_json::from_str(&body).unwrap();
    assert_eq!(report.txid, "tx1");
    assert_eq!(report.units.len(), 2);
    assert!(matches!(report.units[0].outcome, UnitOutcome::Recorded { newly_funded: true, .. }));
    assert_eq!(report.units[1].outcome, UnitOutcome::NotMine);

    let (status, body) =
        post_request("/wallet/transaction", CALLBACK, configure(api)).await.expect("Failed to make request");
    assert_eq!(status, StatusCode::OK);
    let report: ReconciliationReport = serde_json::from_str(&body).unwrap();
    assert!(matches!(report.units[0].outcome, UnitOutcome::AlreadyProcessed { role: Role::Purchase, .. }));
}

#[actix_web::test]
async fn malformed_callback_is_400() {
    let api = reconciler().await;
    let (status, body) = post_request("/wallet/transaction", r#"{"outputs": 3}"#, configure(api))
        .await
        .expect("Failed to make request");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Payload deserialization error"));
}
