//! Striped locks keyed by watched address.
//!
//! Every order has exactly one watched address, so two callbacks that touch the same order always contend for the
//! same stripe. Callbacks for unrelated orders usually land in different stripes and proceed in parallel.
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use log::trace;
use tokio::sync::{Mutex, MutexGuard};

pub struct ShardedLocks {
    shards: Vec<Mutex<()>>,
}

/// Holds one or more stripes until dropped.
pub struct ShardGuard<'a> {
    shards: Vec<usize>,
    _guards: Vec<MutexGuard<'a, ()>>,
}

impl ShardGuard<'_> {
    pub fn shards(&self) -> &[usize] {
        &self.shards
    }
}

impl ShardedLocks {
    pub fn new(count: usize) -> Self {
        let shards = (0..count.max(1)).map(|_| Mutex::new(())).collect();
        Self { shards }
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    pub fn shard_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    /// Acquires the stripes for all `keys`. Stripes are always taken in ascending order, so two callers can never
    /// deadlock on each other.
    pub async fn lock_all<'k, I>(&self, keys: I) -> ShardGuard<'_>
    where I: IntoIterator<Item = &'k str> {
        let mut shards = keys.into_iter().map(|k| self.shard_for(k)).collect::<Vec<_>>();
        shards.sort_unstable();
        shards.dedup();
        let mut guards = Vec::with_capacity(shards.len());
        for &i in &shards {
            guards.push(self.shards[i].lock().await);
        }
        trace!("🧾️ Acquired lock stripes {shards:?}");
        ShardGuard { shards, _guards: guards }
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, time::Duration};

    use super::*;

    #[test]
    fn same_key_same_shard() {
        let locks = ShardedLocks::new(16);
        assert_eq!(locks.shard_for("bc1qabc"), locks.shard_for("bc1qabc"));
        assert!(locks.shard_for("anything") < 16);
        assert_eq!(ShardedLocks::new(0).len(), 1);
    }

    #[tokio::test]
    async fn guard_dedups_and_sorts() {
        let locks = ShardedLocks::new(1);
        let guard = locks.lock_all(["a", "b", "c"]).await;
        assert_eq!(guard.shards(), &[0]);
    }

    #[tokio::test]
    async fn contended_stripe_blocks_until_released() {
        let locks = Arc::new(ShardedLocks::new(4));
        let guard = locks.lock_all(["addr1"]).await;
        let l2 = Arc::clone(&locks);
        let waiter = tokio::spawn(async move {
            let _g = l2.lock_all(["addr1"]).await;
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());
        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn unrelated_stripes_do_not_block() {
        let locks = ShardedLocks::new(64);
        let keys = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let (a, b) = keys
            .iter()
            .flat_map(|x| keys.iter().map(move |y| (*x, *y)))
            .find(|(x, y)| locks.shard_for(x) != locks.shard_for(y))
            .unwrap();
        let _ga = locks.lock_all([a]).await;
        let gb = tokio::time::timeout(Duration::from_millis(100), locks.lock_all([b])).await;
        assert!(gb.is_ok());
    }
}
