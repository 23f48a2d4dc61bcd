use std::env;

use bazaar_common::helpers::parse_boolean_flag;
use bazaar_payment_engine::ReconcilerConfig;
use log::*;

const DEFAULT_BPG_HOST: &str = "127.0.0.1";
const DEFAULT_BPG_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/bazaar_store.db";
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 10;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_db_connections: u32,
    /// If true, pending database migrations are applied before the server starts listening.
    pub run_migrations: bool,
    pub reconciler: ReconcilerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BPG_HOST.to_string(),
            port: DEFAULT_BPG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
            run_migrations: true,
            reconciler: ReconcilerConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("BPG_HOST").ok().unwrap_or_else(|| DEFAULT_BPG_HOST.into());
        let port = env::var("BPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for BPG_PORT. {e} Using the default, {DEFAULT_BPG_PORT}, instead."
                    );
                    DEFAULT_BPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BPG_PORT);
        let database_url = env::var("BPG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ BPG_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_db_connections = env::var("BPG_MAX_DB_CONNECTIONS")
            .map(|s| {
                s.parse::<u32>().ok().filter(|n| *n > 0).unwrap_or_else(|| {
                    error!(
                        "🪛️ {s} is not a valid value for BPG_MAX_DB_CONNECTIONS. Using the default, \
                         {DEFAULT_MAX_DB_CONNECTIONS}, instead."
                    );
                    DEFAULT_MAX_DB_CONNECTIONS
                })
            })
            .unwrap_or(DEFAULT_MAX_DB_CONNECTIONS);
        let run_migrations = parse_boolean_flag(env::var("BPG_RUN_MIGRATIONS").ok(), true);
        let reconciler = ReconcilerConfig::from_env_or_default();
        Self { host, port, database_url, max_db_connections, run_migrations, reconciler }
    }
}
