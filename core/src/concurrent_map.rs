//! Sharded map for aggregating values from many threads at once.
//!
//! Each shard is an ordinary ordered map behind its own mutex, and a key always lives in
//! shard `key mod shard_count`. Writers touching different shards never contend.

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::BTreeMap;

/// Integer keys that can pick a shard by modulus.
pub trait ShardKey: Ord + Copy {
    fn shard_index(&self, shard_count: usize) -> usize;
}

macro_rules! impl_shard_key {
    ($($t:ty),*) => {
        $(impl ShardKey for $t {
            #[inline]
            fn shard_index(&self, shard_count: usize) -> usize {
                (*self as u64 % shard_count as u64) as usize
            }
        })*
    };
}

impl_shard_key!(i32, i64, u32, u64, usize);

pub struct ConcurrentMap<K, V> {
    shards: Vec<Mutex<BTreeMap<K, V>>>,
}

impl<K: ShardKey, V> ConcurrentMap<K, V> {
    pub fn new(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1)).map(|_| Mutex::new(BTreeMap::new())).collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize { self.shards.len() }

    fn shard(&self, key: &K) -> &Mutex<BTreeMap<K, V>> {
        &self.shards[key.shard_index(self.shards.len())]
    }

    /// Lock the key's shard and return its value, inserting the default first if needed.
    /// The shard stays locked until the guard is dropped.
    pub fn access(&self, key: K) -> MappedMutexGuard<'_, V>
    where
        V: Default,
    {
        MutexGuard::map(self.shard(&key).lock(), |shard| shard.entry(key).or_default())
    }

    pub fn erase(&self, key: &K) -> Option<V> { self.shard(key).lock().remove(key) }

    /// Drain every shard into one map, locking shards one at a time. Writes racing with
    /// this call may or may not be included.
    pub fn build_ordinary_map(&self) -> BTreeMap<K, V> {
        let mut result = BTreeMap::new();
        for shard in &self.shards {
            result.append(&mut *shard.lock());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn keys_are_spread_by_modulus() {
        assert_eq!(7i32.shard_index(4), 3);
        assert_eq!(8u64.shard_index(4), 0);
        let map: ConcurrentMap<i32, f64> = ConcurrentMap::new(0);
        assert_eq!(map.shard_count(), 1);
    }

    #[test]
    fn access_inserts_default_and_accumulates() {
        let map: ConcurrentMap<i32, f64> = ConcurrentMap::new(3);
        *map.access(5) += 1.5;
        *map.access(5) += 0.5;
        *map.access(2) += 1.0;
        let flat = map.build_ordinary_map();
        assert_eq!(flat.into_iter().collect::<Vec<_>>(), vec![(2, 1.0), (5, 2.0)]);
    }

    #[test]
    fn erase_removes_only_that_key() {
        let map: ConcurrentMap<i32, i32> = ConcurrentMap::new(2);
        *map.access(1) = 10;
        *map.access(3) = 30;
        assert_eq!(map.erase(&1), Some(10));
        assert_eq!(map.erase(&1), None);
        assert_eq!(map.build_ordinary_map().len(), 1);
    }

    #[test]
    fn parallel_increments_are_not_lost() {
        let map: ConcurrentMap<u32, u64> = ConcurrentMap::new(8);
        (0..10_000u32).into_par_iter().for_each(|i| *map.access(i % 100) += 1);
        let flat = map.build_ordinary_map();
        assert_eq!(flat.len(), 100);
        assert!(flat.values().all(|&count| count == 100));
    }
}
