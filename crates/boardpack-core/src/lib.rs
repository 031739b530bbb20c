//! Package index generation for boardpack.
//!
//! This crate ties together the schema records and the fetcher into the
//! generation pipeline: `BuildConfig` carries every input the run needs, the
//! template builders turn it into undescribed platform/tool records, the
//! `ArchiveDescriber` downloads and fingerprints each archive, and
//! `assemble`/`generate` merge the result into the upstream index and write
//! it to disk.

pub mod assemble;
pub mod config;
pub mod describe;
pub mod template;

pub use assemble::{assemble, generate, write_index, AssembleReport, GenerateResult};
pub use config::{BuildConfig, ConfigError, PlatformConfig, SystemConfig, ToolConfig};
pub use describe::{filename_from_url, sha256_checksum, ArchiveDescriber};
pub use template::{platform_template, tool_template};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("config file error: {0}")]
    ConfigFile(#[from] ConfigError),
    #[error("fetch error: {0}")]
    Fetch(#[from] boardpack_remote::FetchError),
    #[error("index error: {0}")]
    Index(#[from] boardpack_schema::IndexError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
