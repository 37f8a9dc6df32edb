pub mod application;
pub mod auth;
pub mod config;
pub mod error;
pub mod render;
pub mod state;
pub mod storage;

// Re-export common error type
pub use error::PortalError;
