pub mod application_repository;
pub mod config_service;
pub mod dto;
pub mod file_reader;
pub mod login_session_repository;
pub mod paths;
pub mod storage;

pub use crate::application_repository::StoreApplicationRepository;
pub use crate::config_service::ConfigService;
pub use crate::file_reader::FsFileReader;
pub use crate::login_session_repository::SessionLoginRepository;
pub use crate::storage::{FileStore, MemoryStore};
