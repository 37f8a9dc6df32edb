//! Key-value store interface.
//!
//! Both the durable store (survives restarts) and the session store (cleared
//! when the session ends) implement this trait. Values are opaque strings.

use async_trait::async_trait;

use crate::error::Result;

/// Storage key holding the serialized application list.
pub const APPLICATIONS_KEY: &str = "applications";

/// Session storage key holding the admin login marker.
pub const LOGIN_FLAG_KEY: &str = "isAdminLoggedIn";

/// Literal marker stored under [`LOGIN_FLAG_KEY`] while logged in.
pub const LOGIN_FLAG_VALUE: &str = "true";

/// A string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value for `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::QuotaExceeded` if the store is full.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
