//! Unified path management for portal files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/job-portal/        # Config directory
//! └── config.toml              # Portal configuration
//!
//! ~/.local/share/job-portal/   # Data directory
//! └── storage/                 # Durable key-value store
//!     └── applications.value
//! ```
//!
//! Passing a base directory roots everything under it instead (used by tests).

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "job-portal";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config or data directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for portal_core::PortalError {
    fn from(err: PathError) -> Self {
        portal_core::PortalError::config(err.to_string())
    }
}

/// Resolves portal paths, optionally under a custom base directory.
#[derive(Debug, Clone, Default)]
pub struct PortalPaths {
    base_dir: Option<PathBuf>,
}

impl PortalPaths {
    /// Creates a resolver. `None` uses the platform directories.
    pub fn new(base_dir: Option<&Path>) -> Self {
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
        }
    }

    /// Returns the portal configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.join("config")),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the portal data directory.
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.join("data")),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the default root of the durable store.
    pub fn storage_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("storage"))
    }
}
