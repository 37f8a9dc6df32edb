//! KeyValueStore-based LoginSessionRepository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use portal_core::application::LoginSessionRepository;
use portal_core::error::Result;
use portal_core::storage::{KeyValueStore, LOGIN_FLAG_KEY, LOGIN_FLAG_VALUE};

/// Keeps the admin login marker in a session-scoped store.
#[derive(Clone)]
pub struct SessionLoginRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SessionLoginRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl LoginSessionRepository for SessionLoginRepository {
    async fn check_login_status(&self) -> bool {
        match self.store.get(LOGIN_FLAG_KEY).await {
            Ok(value) => value.as_deref() == Some(LOGIN_FLAG_VALUE),
            Err(e) => {
                tracing::warn!("Failed to read login flag, treating as logged out: {}", e);
                false
            }
        }
    }

    async fn set_logged_in(&self) -> Result<()> {
        self.store.set(LOGIN_FLAG_KEY, LOGIN_FLAG_VALUE).await
    }

    async fn clear_login(&self) -> Result<()> {
        self.store.remove(LOGIN_FLAG_KEY).await
    }
}
