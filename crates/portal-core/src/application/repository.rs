//! Persistence interfaces for application records and the login session.

use async_trait::async_trait;

use super::model::Application;
use crate::error::Result;

/// An abstract repository for the application list.
///
/// The list is always read and written as a whole; there are no partial
/// updates.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Loads the stored application list.
    ///
    /// Never fails: a missing value yields an empty list, and corrupt or
    /// unreadable data is logged and treated as no data.
    async fn load_applications(&self) -> Vec<Application>;

    /// Overwrites the stored list with `applications`.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: List persisted
    /// - `Err(_)`: Write failed (already logged); in-memory state stays authoritative
    async fn save_applications(&self, applications: &[Application]) -> Result<()>;
}

/// An abstract repository for the session-scoped admin login flag.
#[async_trait]
pub trait LoginSessionRepository: Send + Sync {
    /// Returns `true` only if the session holds the logged-in marker.
    async fn check_login_status(&self) -> bool;

    /// Records a successful login for the rest of the session.
    async fn set_logged_in(&self) -> Result<()>;

    /// Removes the login marker.
    async fn clear_login(&self) -> Result<()>;
}
