//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the portal configuration
//! from the configuration file (~/.config/job-portal/config.toml).

use std::path::{Path, PathBuf};

use portal_core::config::PortalConfig;
use portal_core::error::{PortalError, Result};

use crate::paths::PortalPaths;

/// Configuration service that loads the portal configuration.
///
/// A missing file is created with default values so users have something to
/// edit. A present but malformed file is an error.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: PortalPaths,
}

impl ConfigService {
    /// Creates a service using the platform config directory.
    pub fn new() -> Self {
        Self::with_base_dir(None)
    }

    /// Creates a service rooted at a custom base directory (for testing).
    pub fn with_base_dir(base_dir: Option<&Path>) -> Self {
        Self {
            paths: PortalPaths::new(base_dir),
        }
    }

    /// Loads the configuration, writing defaults if the file is missing.
    pub fn load_or_create(&self) -> Result<PortalConfig> {
        let config_path = self.paths.config_file()?;

        if !config_path.exists() {
            let default_config = PortalConfig::default();
            self.save(&config_path, &default_config)?;
            tracing::info!("Created default configuration at {:?}", config_path);
            return Ok(default_config);
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            PortalError::config(format!("Failed to read {:?}: {}", config_path, e))
        })?;

        if content.trim().is_empty() {
            return Ok(PortalConfig::default());
        }

        toml::from_str(&content).map_err(|e| {
            PortalError::config(format!("Failed to parse {:?}: {}", config_path, e))
        })
    }

    /// Resolves the durable store directory for `config`.
    pub fn storage_dir(&self, config: &PortalConfig) -> Result<PathBuf> {
        match &config.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.paths.storage_dir()?),
        }
    }

    fn save(&self, path: &Path, config: &PortalConfig) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(config)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_base_dir(Some(temp_dir.path()));

        let config = service.load_or_create().unwrap();
        assert_eq!(config, PortalConfig::default());
        assert!(temp_dir.path().join("config/config.toml").exists());

        // Second load reads the file that was just written.
        assert_eq!(service.load_or_create().unwrap(), config);
    }

    #[test]
    fn test_storage_dir_override() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_base_dir(Some(temp_dir.path()));

        let mut config = PortalConfig::default();
        assert_eq!(
            service.storage_dir(&config).unwrap(),
            temp_dir.path().join("data/storage")
        );

        config.storage.data_dir = Some(PathBuf::from("/srv/portal"));
        assert_eq!(service.storage_dir(&config).unwrap(), PathBuf::from("/srv/portal"));
    }

    #[test]
    fn test_malformed_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "[storage\nquota_bytes = ").unwrap();

        let service = ConfigService::with_base_dir(Some(temp_dir.path()));
        let err = service.load_or_create().unwrap_err();
        assert!(matches!(err, PortalError::Config(_)));
    }
}
