//! File selection and reading.
//!
//! Defines the interface used to turn a user-selected file into an embedded
//! [`FileAttachment`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::data_url::DataUrl;
use super::model::FileAttachment;
use crate::error::Result;

/// A file chosen in one of the form's file inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Name shown to the user and used as the download name.
    pub name: String,
    /// Location the content is read from.
    pub path: PathBuf,
}

impl SelectedFile {
    /// Selects a file by path, naming it after the last path component.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            path: path.to_path_buf(),
        }
    }
}

/// Raw content of a selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Reads the full content of a selected file.
///
/// Implementations must not block the calling thread while waiting on I/O.
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Reads the file.
    ///
    /// # Returns
    ///
    /// - `Ok(FileContents)`: Full content and its media type
    /// - `Err(PortalError::FileRead)`: The file could not be read
    async fn read(&self, file: &SelectedFile) -> Result<FileContents>;
}

/// Encodes an optional file selection as an attachment.
///
/// No selection resolves to `Ok(None)` without touching the reader; this is
/// the normal case for optional inputs.
pub async fn read_file_as_data_url(
    reader: &dyn FileReader,
    file: Option<&SelectedFile>,
) -> Result<Option<FileAttachment>> {
    let Some(file) = file else {
        return Ok(None);
    };

    let contents = reader.read(file).await?;
    Ok(Some(FileAttachment {
        name: file.name.clone(),
        data_url: DataUrl::encode(&contents.mime_type, &contents.bytes),
    }))
}
