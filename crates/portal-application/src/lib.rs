//! Application layer for the job portal.
//!
//! This crate provides the `Portal` use case, which owns the portal state and
//! coordinates the domain with the injected stores, verifier and file reader.

pub mod portal;

pub use portal::{Download, PageSink, Portal};
