//! Fetching of remote documents for boardpack.
//!
//! This crate provides the `Fetcher` trait used by the assembler to download
//! the upstream package index and each archive, an HTTP implementation backed
//! by `ureq`, and an in-memory implementation for tests and offline runs.

pub mod http;
pub mod memory;

pub use http::HttpFetcher;
pub use memory::MemoryFetcher;

use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {code} for {url}")]
    Status { url: String, code: u16 },
    #[error("not found: {0}")]
    NotFound(String),
}

/// Source of remote bytes.
///
/// Implementations perform exactly one request per call: no caching, no
/// retry.
pub trait Fetcher: Send + Sync {
    /// Download the full body at `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Download `url` and write the body to `path`, replacing any existing
    /// file.
    fn fetch_to_file(&self, url: &str, path: &Path) -> Result<(), FetchError> {
        let body = self.fetch(url)?;
        tracing::debug!("writing {} bytes to {}", body.len(), path.display());
        fs::write(path, &body)?;
        Ok(())
    }
}
