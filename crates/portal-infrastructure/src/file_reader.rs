//! Filesystem FileReader implementation.

use async_trait::async_trait;
use portal_core::application::{DEFAULT_MIME_TYPE, FileContents, FileReader, SelectedFile};
use portal_core::error::{PortalError, Result};
use tokio::fs;

/// Reads selected files from the local filesystem.
///
/// The media type is guessed from the selected file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileReader;

impl FsFileReader {
    pub fn new() -> Self {
        Self
    }
}

/// Guesses the MIME type from a file name.
pub fn guess_mime_type(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or(DEFAULT_MIME_TYPE)
        .to_string()
}

#[async_trait]
impl FileReader for FsFileReader {
    async fn read(&self, file: &SelectedFile) -> Result<FileContents> {
        let bytes = fs::read(&file.path)
            .await
            .map_err(|e| PortalError::file_read(&file.name, e.to_string()))?;

        tracing::debug!("Read {} byte(s) from {:?}", bytes.len(), file.path);

        Ok(FileContents {
            mime_type: guess_mime_type(&file.name),
            bytes,
        })
    }
}
