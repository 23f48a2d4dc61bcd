use std::{env, str::FromStr, time::Duration};

use log::*;

const DEFAULT_LOCK_SHARDS: usize = 16;
const DEFAULT_UNIT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

#[derive(Clone, Debug)]
pub struct ReconcilerConfig {
    /// Number of lock stripes. Callbacks touching addresses in different stripes are reconciled concurrently. A
    /// value of 1 serializes every callback behind one lock.
    pub lock_shards: usize,
    /// Upper bound on the time spent reconciling a single output or input.
    pub unit_timeout: Duration,
    /// Capacity of each event hook channel.
    pub event_buffer_size: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            lock_shards: DEFAULT_LOCK_SHARDS,
            unit_timeout: DEFAULT_UNIT_TIMEOUT,
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl ReconcilerConfig {
    pub fn with_lock_shards(mut self, lock_shards: usize) -> Self {
        self.lock_shards = lock_shards.max(1);
        self
    }

    pub fn with_unit_timeout(mut self, unit_timeout: Duration) -> Self {
        self.unit_timeout = unit_timeout;
        self
    }

    pub fn from_env_or_default() -> Self {
        let lock_shards = parse_env("BPG_LOCK_SHARDS", DEFAULT_LOCK_SHARDS).max(1);
        let unit_timeout = parse_env("BPG_UNIT_TIMEOUT_SECS", DEFAULT_UNIT_TIMEOUT.as_secs());
        let event_buffer_size = parse_env("BPG_EVENT_BUFFER_SIZE", DEFAULT_EVENT_BUFFER_SIZE).max(1);
        Self { lock_shards, unit_timeout: Duration::from_secs(unit_timeout), event_buffer_size }
    }
}

fn parse_env<T>(var: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(s) => s.parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {var}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            debug!("🪛️ {var} is not set. Using the default, {default}.");
            default
        },
    }
}
