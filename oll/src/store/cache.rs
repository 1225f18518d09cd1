use std::collections::HashMap;

use crate::error::Error;
use crate::store::{StoreKey, WeightStore};
use crate::sync::{RwLock, RwLockUpgradableReadGuard};

type Result<T> = std::result::Result<T, Error>;

/// Read-through, write-through cache in front of a [`WeightStore`].
///
/// A key is looked up in the store at most once per cache: the stored value, or
/// the caller's default when the key was never written, is kept from then on.
/// Writes go to the store first and only then replace the cached value, so a
/// failed write leaves the cache agreeing with what is durable.
pub struct WeightCache<S> {
    store: S,
    entries: RwLock<HashMap<StoreKey, f64>>,
}

impl<S: WeightStore> WeightCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Value of `key`, loading it from the store (or materializing `default`) on first access
    pub fn fetch(&self, key: &StoreKey, default: f64) -> Result<f64> {
        if let Some(value) = self.entries.read().get(key) {
            return Ok(*value);
        }

        // only one upgradable guard exists at a time, so racing misses on a key
        // wait here and find the value the first one cached
        let entries = self.entries.upgradable_read();
        if let Some(value) = entries.get(key) {
            return Ok(*value);
        }

        let value = self.store.get(&key.encode())?.unwrap_or(default);
        tracing::trace!(key = ?key, value, "cache miss");

        let mut entries = RwLockUpgradableReadGuard::upgrade(entries);
        entries.insert(key.clone(), value);
        Ok(value)
    }

    /// Persists `value` under `key` and caches it
    pub fn update(&mut self, key: StoreKey, value: f64) -> Result<()> {
        self.store.set(&key.encode(), value)?;
        self.entries.get_mut().insert(key, value);
        Ok(())
    }

    /// Number of cached keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::WeightCache;
    use crate::data::FeatureKey;
    use crate::error::Error;
    use crate::store::{MemoryStore, ModelScalar, StoreKey, WeightStore};
    use crate::Extension;

    type Result<T> = std::result::Result<T, Error>;

    /// Counts lookups and can be told to fail writes
    #[derive(Default)]
    pub struct CountingStore {
        pub inner: MemoryStore,
        pub lookups: AtomicUsize,
        pub fail_writes: bool,
    }

    impl CountingStore {
        pub fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    impl Extension for CountingStore {
        fn id(&self) -> String {
            "counting".into()
        }

        fn name(&self) -> String {
            self.id()
        }
    }

    impl WeightStore for CountingStore {
        fn open(&mut self) -> Result<()> {
            self.inner.open()
        }

        fn get(&self, key: &[u8]) -> Result<Option<f64>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key)
        }

        fn set(&mut self, key: &[u8], value: f64) -> Result<()> {
            if self.fail_writes {
                return Err(Error::Storage("write refused".into()));
            }
            self.inner.set(key, value)
        }
    }

    fn opened() -> anyhow::Result<CountingStore> {
        let mut store = CountingStore::default();
        store.open()?;
        Ok(store)
    }

    #[test]
    fn miss_is_looked_up_once() -> anyhow::Result<()> {
        let cache = WeightCache::new(opened()?);
        let key = StoreKey::Weight(FeatureKey::from("ab"));

        assert_eq!(cache.fetch(&key, 0.0)?, 0.0);
        assert_eq!(cache.fetch(&key, 0.0)?, 0.0);
        assert_eq!(cache.fetch(&key, 5.0)?, 0.0);
        assert_eq!(cache.store().lookups(), 1);
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[test]
    fn concurrent_misses_share_one_lookup() -> anyhow::Result<()> {
        let cache = WeightCache::new(opened()?);
        let key = StoreKey::Weight(FeatureKey::from("ab"));
        let barrier = std::sync::Barrier::new(8);

        std::thread::scope(|scope| {
            let readers = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cache.fetch(&key, 0.0)
                    })
                })
                .collect::<Vec<_>>();
            for reader in readers {
                let value = reader
                    .join()
                    .map_err(|_| anyhow::anyhow!("reader panicked"))??;
                assert_eq!(value, 0.0);
            }
            Ok::<_, anyhow::Error>(())
        })?;

        assert_eq!(cache.store().lookups(), 1);
        Ok(())
    }

    #[test]
    fn reads_persisted_values() -> anyhow::Result<()> {
        let mut store = opened()?;
        let key = StoreKey::Scalar(ModelScalar::Bias);
        store.set(&key.encode(), 2.5)?;

        let cache = WeightCache::new(store);
        assert_eq!(cache.fetch(&key, 0.0)?, 2.5);
        Ok(())
    }

    #[test]
    fn writes_through() -> anyhow::Result<()> {
        let mut cache = WeightCache::new(opened()?);
        let key = StoreKey::Weight(FeatureKey::from("ab"));

        cache.update(key.clone(), 1.5)?;
        assert_eq!(cache.fetch(&key, 0.0)?, 1.5);
        assert_eq!(cache.store().lookups(), 0);
        assert_eq!(cache.store().inner.get(&key.encode())?, Some(1.5));
        Ok(())
    }

    #[test]
    fn failed_write_keeps_cached_value() -> anyhow::Result<()> {
        let mut cache = WeightCache::new(opened()?);
        let key = StoreKey::Weight(FeatureKey::from("ab"));
        cache.update(key.clone(), 1.0)?;

        let mut store = cache.into_store();
        store.fail_writes = true;
        let mut cache = WeightCache::new(store);
        assert_eq!(cache.fetch(&key, 0.0)?, 1.0);

        let error = cache.update(key.clone(), 9.0).unwrap_err();
        assert!(error.is_storage());
        assert_eq!(cache.fetch(&key, 0.0)?, 1.0);
        Ok(())
    }
}
