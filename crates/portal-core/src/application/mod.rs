//! Application domain module.
//!
//! # Module Structure
//!
//! - `model`: Application record, attachment slots and form drafts
//! - `data_url`: `data:` URL codec for embedded file content
//! - `file`: File selection and the reader interface
//! - `repository`: Persistence traits for records and the login flag

mod data_url;
mod file;
mod model;
pub mod repository;

// Re-export public API
pub use data_url::{DEFAULT_MIME_TYPE, DataUrl};
pub use file::{FileContents, FileReader, SelectedFile, read_file_as_data_url};
pub use model::{
    Application, ApplicationFiles, ApplicationForm, ApplicationId, FileAttachment, FileSlot,
    LoginForm,
};
pub use repository::{ApplicationRepository, LoginSessionRepository};
