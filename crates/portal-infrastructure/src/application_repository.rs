//! KeyValueStore-based ApplicationRepository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use portal_core::application::{Application, ApplicationRepository};
use portal_core::error::Result;
use portal_core::storage::{APPLICATIONS_KEY, KeyValueStore};

use crate::dto::{decode_applications, encode_applications};

/// Stores the whole application list under a single key of a durable store.
///
/// Loading never fails: missing data is an empty list and corrupt data is
/// logged and treated as no data. Saving failures are logged and returned;
/// callers keep their in-memory list as the source of truth.
#[derive(Clone)]
pub struct StoreApplicationRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StoreApplicationRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ApplicationRepository for StoreApplicationRepository {
    async fn load_applications(&self) -> Vec<Application> {
        let raw = match self.store.get(APPLICATIONS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!("Failed to load applications from storage: {}", e);
                return Vec::new();
            }
        };

        match decode_applications(&raw) {
            Ok(decoded) => {
                for reason in &decoded.rejected {
                    tracing::warn!("Skipping malformed stored application: {}", reason);
                }
                tracing::debug!(
                    "Loaded {} application(s) from storage",
                    decoded.applications.len()
                );
                decoded.applications
            }
            Err(e) => {
                tracing::error!("Failed to load applications from storage: {}", e);
                Vec::new()
            }
        }
    }

    async fn save_applications(&self, applications: &[Application]) -> Result<()> {
        let result = match encode_applications(applications) {
            Ok(raw) => self.store.set(APPLICATIONS_KEY, &raw).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::error!("Failed to save applications to storage: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use chrono::{TimeZone, Utc};
    use portal_core::application::{ApplicationFiles, ApplicationId, DataUrl, FileAttachment};
    use tempfile::TempDir;

    fn application(id: i64, name: &str) -> Application {
        Application {
            id: ApplicationId(id),
            submitted_at: Utc.timestamp_millis_opt(id).unwrap(),
            full_name: name.to_string(),
            email: "someone@example.com".to_string(),
            phone: "555-0000".to_string(),
            files: ApplicationFiles {
                resume: None,
                cover_letter: Some(FileAttachment {
                    name: "letter.txt".to_string(),
                    data_url: DataUrl::encode("text/plain", b"Dear hiring manager"),
                }),
                transcripts: None,
            },
        }
    }

    #[tokio::test]
    async fn test_missing_key_loads_empty() {
        let repo = StoreApplicationRepository::new(Arc::new(MemoryStore::new()));
        assert!(repo.load_applications().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_value_loads_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(APPLICATIONS_KEY, "{this is not json").await.unwrap();

        let repo = StoreApplicationRepository::new(store);
        assert!(repo.load_applications().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_reload_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let apps = vec![
            application(1_736_980_205_000, "Jane Doe"),
            application(1_736_980_206_000, "John Roe"),
        ];

        let store = Arc::new(FileStore::new(temp_dir.path()).await.unwrap());
        StoreApplicationRepository::new(store)
            .save_applications(&apps)
            .await
            .unwrap();

        let reopened = Arc::new(FileStore::new(temp_dir.path()).await.unwrap());
        let loaded = StoreApplicationRepository::new(reopened)
            .load_applications()
            .await;
        assert_eq!(loaded, apps);
    }

    #[tokio::test]
    async fn test_save_failure_is_returned_and_store_unchanged() {
        let store = Arc::new(MemoryStore::with_quota(64));
        let repo = StoreApplicationRepository::new(store.clone());

        let err = repo
            .save_applications(&[application(1, "Too big for the quota")])
            .await
            .unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(store.get(APPLICATIONS_KEY).await.unwrap(), None);
    }
}
