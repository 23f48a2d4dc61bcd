use bazaar_payment_engine::{
    db_types::{OrderRecord, Role},
    events::EventProducers,
    test_utils::prepare_env::{create_database, random_db_path, run_migrations},
    OrderStore,
    ReconcilerConfig,
    SqliteDatabase,
    TransactionReconciler,
};
use cucumber::World;
use log::*;

#[derive(Default, Debug, World)]
pub struct MarketplaceWorld {
    pub system: Option<ReconcilerSystem>,
}

#[derive(Debug)]
pub struct ReconcilerSystem {
    pub db_path: String,
    pub api: TransactionReconciler<SqliteDatabase>,
}

impl MarketplaceWorld {
    pub fn api(&self) -> &TransactionReconciler<SqliteDatabase> {
        &self.system.as_ref().expect("Reconciler not initialised").api
    }

    pub async fn order(&self, role: Role, address: &str) -> OrderRecord {
        self.api()
            .db()
            .fetch_order_by_payment_address(role, address)
            .await
            .expect("Error fetching order")
            .unwrap_or_else(|| panic!("No {role} is watching {address}"))
    }
}

impl ReconcilerSystem {
    pub async fn new() -> Self {
        let url = prepare_test_env().await;
        let db = SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating connection to database");
        debug!("Created database: {url}");
        let api = TransactionReconciler::new(db, EventProducers::default(), ReconcilerConfig::default());
        Self { db_path: url, api }
    }
}

pub async fn prepare_test_env() -> String {
    let path = random_db_path();
    create_database(&path).await;
    run_migrations(&path).await;
    path
}
