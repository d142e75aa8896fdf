use crate::core::cache::KeyValueStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory store, used in tests and when the disk store is unavailable.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.inner.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.inner.lock().await.contains_key(key))
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let map = self.inner.lock().await;
        Ok(map
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set_has() {
        let store = MemoryStore::new();

        assert_eq!(store.get("key1").await.unwrap(), None);
        assert!(!store.has("key1").await.unwrap());

        store.set("key1", "one".to_string()).await.unwrap();
        assert_eq!(store.get("key1").await.unwrap().as_deref(), Some("one"));
        assert!(store.has("key1").await.unwrap());

        store.set("key1", "uno".to_string()).await.unwrap();
        assert_eq!(store.get("key1").await.unwrap().as_deref(), Some("uno"));
    }

    #[tokio::test]
    async fn test_scan_prefix() {
        let store = MemoryStore::new();
        store.set("exchange_b", "2".to_string()).await.unwrap();
        store.set("exchange_a", "1".to_string()).await.unwrap();
        store.set("exchangf", "x".to_string()).await.unwrap();
        store.set("aaa", "y".to_string()).await.unwrap();

        let entries = store.scan_prefix("exchange_").await.unwrap();
        assert_eq!(
            entries,
            vec![
                ("exchange_a".to_string(), "1".to_string()),
                ("exchange_b".to_string(), "2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v".to_string()).await.unwrap();
        assert!(other.has("k").await.unwrap());
    }
}
