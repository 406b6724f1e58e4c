use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::{CoreError, CoreResult};

/// Minimal string key/value store for small per-user client state
/// (e.g. which alert ids a user has already looked at).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> CoreResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> CoreResult<()>;
}

/// Process-local store, used in tests and in memory mode
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| CoreError::Store("lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CoreError::Store("lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
