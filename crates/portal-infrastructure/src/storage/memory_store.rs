//! In-memory key-value store.
//!
//! Used as the session-scoped store: its content lives exactly as long as the
//! value itself, which the host ties to the session.

use std::collections::HashMap;

use async_trait::async_trait;
use portal_core::error::{PortalError, Result};
use portal_core::storage::KeyValueStore;
use tokio::sync::Mutex;

/// A `HashMap`-backed store with an optional byte quota.
///
/// The quota counts the UTF-8 length of every stored key and value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Creates an empty, unlimited store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that refuses writes beyond `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota: Some(quota),
        }
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;

        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let requested = others + key.len() + value.len();
            if requested > quota {
                return Err(PortalError::QuotaExceeded { requested, quota });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
