//! Directory-backed durable key-value store.
//!
//! Provides:
//! - **Atomicity**: Values are replaced via tmp file + atomic rename
//! - **Durability**: Explicit fsync before rename
//! - **Isolation**: Writes within one process are serialized
//!
//! Directory structure:
//! ```text
//! base_dir/
//! ├── applications.value
//! └── <key>.value
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use portal_core::error::{PortalError, Result};
use portal_core::storage::KeyValueStore;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const VALUE_EXTENSION: &str = "value";

/// A durable store keeping one file per key under a base directory.
#[derive(Debug)]
pub struct FileStore {
    base_dir: PathBuf,
    quota: Option<usize>,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Creates a store rooted at `base_dir`, creating the directory if needed.
    pub async fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir).await.map_err(|e| {
            PortalError::io(format!(
                "Failed to create storage directory {:?}: {}",
                base_dir, e
            ))
        })?;

        Ok(Self {
            base_dir,
            quota: None,
            write_lock: Mutex::new(()),
        })
    }

    /// Refuses writes that would grow the stored values beyond `quota` bytes.
    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Directory holding the value files.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file holding `key`.
    fn value_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.base_dir.join(format!("{key}.{VALUE_EXTENSION}")))
    }

    /// Temporary file used for atomic writes of `key`.
    fn temp_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!(".{key}.{VALUE_EXTENSION}.tmp"))
    }

    /// Total size of stored values, excluding `skip_key`.
    async fn used_bytes_except(&self, skip_key: &str) -> Result<usize> {
        let mut used = 0usize;
        let mut entries = fs::read_dir(&self.base_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            if path.file_stem().and_then(|s| s.to_str()) == Some(skip_key) {
                continue;
            }
            used += entry.metadata().await?.len() as usize;
        }
        Ok(used)
    }
}

/// Keys become file names, so they are restricted to a safe alphabet.
fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(PortalError::storage(format!("invalid storage key '{}'", key)))
    }
}

/// Writes `value` to `tmp_path`, syncs it, then renames it over `path`.
async fn write_atomic(tmp_path: &Path, path: &Path, value: &str) -> std::io::Result<()> {
    // Write to temporary file in the same directory
    let mut tmp_file = fs::File::create(tmp_path).await?;
    tmp_file.write_all(value.as_bytes()).await?;

    // Ensure data is written to disk
    tmp_file.sync_all().await?;
    drop(tmp_file);

    // Atomic rename
    fs::rename(tmp_path, path).await
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortalError::io(format!("Failed to read {:?}: {}", path, e))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.value_path(key)?;
        let _guard = self.write_lock.lock().await;

        if let Some(quota) = self.quota {
            let requested = self.used_bytes_except(key).await? + value.len();
            if requested > quota {
                return Err(PortalError::QuotaExceeded { requested, quota });
            }
        }

        let tmp_path = self.temp_path(key);
        if let Err(e) = write_atomic(&tmp_path, &path, value).await {
            // A failed write must not leave a partial temp file behind.
            let _ = fs::remove_file(&tmp_path).await;
            return Err(PortalError::io(format!("Failed to write {:?}: {}", path, e)));
        }

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.value_path(key)?;
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("storage")).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let (store, _temp_dir) = create_test_store().await;
        assert_eq!(store.get("applications").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_survives_reopen() {
        let (store, temp_dir) = create_test_store().await;
        store.set("applications", "[]").await.unwrap();

        let reopened = FileStore::new(temp_dir.path().join("storage")).await.unwrap();
        assert_eq!(
            reopened.get("applications").await.unwrap(),
            Some("[]".to_string())
        );
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_file() {
        let (store, _temp_dir) = create_test_store().await;
        store.set("applications", "first").await.unwrap();
        store.set("applications", "second").await.unwrap();

        assert_eq!(
            store.get("applications").await.unwrap(),
            Some("second".to_string())
        );
        assert!(!store.temp_path("applications").exists());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let (store, _temp_dir) = create_test_store().await;

        // A non-empty directory in place of the value file makes the rename fail.
        let blocker = store.base_dir().join("applications.value");
        std::fs::create_dir_all(blocker.join("inner")).unwrap();

        let err = store.set("applications", "[]").await.unwrap_err();
        assert!(matches!(err, PortalError::Io { .. }));
        assert!(!store.temp_path("applications").exists());
        assert!(blocker.is_dir());
    }

    #[tokio::test]
    async fn test_remove() {
        let (store, _temp_dir) = create_test_store().await;
        store.set("k", "v").await.unwrap();
        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_keys_rejected() {
        let (store, _temp_dir) = create_test_store().await;
        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(store.set(key, "v").await.is_err(), "{key:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn test_quota() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path()).await.unwrap().with_quota(10);

        store.set("a", "123456").await.unwrap();
        let err = store.set("b", "12345").await.unwrap_err();
        assert!(err.is_quota_exceeded());

        // Replacing a key does not count its old size.
        store.set("a", "1234567890").await.unwrap();
        assert_eq!(store.get("b").await.unwrap(), None);
    }
}
