//! pdf-share - Upload a PDF, get a share link, serve it back
//!
//! This crate provides:
//! - A storage directory checked for writability at startup
//! - Multipart PDF upload with type and size validation
//! - An in-memory registry of uploads with download counters
//! - Inline or attachment retrieval, metadata lookup and a preview page

pub mod api;
pub mod config;
pub mod object_store;
pub mod registry;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use config::Config;
use registry::Registry;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub registry: Registry,
    pub object_store: Arc<dyn object_store::ObjectStore>,
}
