// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory [`ConfigStore`] fake.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tile_config::{ConfigError, ConfigStore};

/// Map-backed [`ConfigStore`] that counts calls and can be told to fail.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect the other.
///
/// ```
/// use tile_config::ConfigService;
/// use tile_dry_tests::InMemoryConfigStore;
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
/// service
///     .save("device", &serde_json::json!({"address": "192.168.1.40"}))
///     .unwrap();
/// assert_eq!(store.save_count(), 1);
/// assert!(store.get("device").is_some());
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    data: BTreeMap<String, Vec<u8>>,
    loads: usize,
    saves: usize,
    fail_load: bool,
    fail_save: bool,
}

impl InMemoryConfigStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let store = Self::new();
        store.lock().data = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Make `read` fail with [`ConfigError::Backend`].
    pub fn set_fail_on_load(&self, fail: bool) {
        self.lock().fail_load = fail;
    }

    /// Make `write` fail with [`ConfigError::Backend`].
    pub fn set_fail_on_save(&self, fail: bool) {
        self.lock().fail_save = fail;
    }

    /// `read` calls so far, failed ones included.
    pub fn load_count(&self) -> usize {
        self.lock().loads
    }

    /// `write` calls so far, failed ones included.
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Stored blob for `key`, bypassing the counters.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().data.get(key).cloned()
    }

    /// Stored keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().data.keys().cloned().collect()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ConfigError> {
        let mut inner = self.lock();
        inner.loads += 1;
        if inner.fail_load {
            return Err(ConfigError::Backend("simulated load failure".into()));
        }
        Ok(inner.data.get(key).cloned())
    }

    fn write(&self, key: &str, doc: &[u8]) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        inner.saves += 1;
        if inner.fail_save {
            return Err(ConfigError::Backend("simulated save failure".into()));
        }
        inner.data.insert(key.to_owned(), doc.to_vec());
        Ok(())
    }
}
