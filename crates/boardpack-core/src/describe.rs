use crate::CoreError;
use boardpack_remote::Fetcher;
use boardpack_schema::ArchiveDescriptor;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use ureq::http::Uri;

/// Last `/` segment of the URL path. Query and fragment are ignored.
///
/// Fails without touching the network when the URL is not absolute or its
/// path has no final segment (e.g. ends in `/`).
pub fn filename_from_url(url: &str) -> Result<String, CoreError> {
    let uri: Uri = url
        .parse()
        .map_err(|e| CoreError::Config(format!("invalid URL '{url}': {e}")))?;
    if uri.scheme().is_none() {
        return Err(CoreError::Config(format!("URL is not absolute: '{url}'")));
    }
    let name = uri.path().rsplit('/').next().unwrap_or_default();
    if name.is_empty() {
        return Err(CoreError::Config(format!(
            "URL does not contain a filename: '{url}'"
        )));
    }
    if name == "." || name == ".." || name.contains('\\') {
        return Err(CoreError::Config(format!(
            "URL filename '{name}' is not usable as a local file name"
        )));
    }
    Ok(name.to_owned())
}

/// `SHA-256:` followed by the uppercase hex digest of `data`.
pub fn sha256_checksum(data: &[u8]) -> String {
    format!("SHA-256:{:X}", Sha256::digest(data))
}

/// Downloads archives into a work directory and reports their filename,
/// checksum and size.
///
/// Every call downloads again; an existing file of the same name is
/// overwritten, never reused. Downloaded files are left in place.
pub struct ArchiveDescriber<'a> {
    fetcher: &'a dyn Fetcher,
    work_dir: PathBuf,
}

impl<'a> ArchiveDescriber<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn describe(&self, url: &str) -> Result<ArchiveDescriptor, CoreError> {
        let filename = filename_from_url(url)?;
        let path = self.work_dir.join(&filename);

        info!("downloading {url}");
        self.fetcher.fetch_to_file(url, &path)?;

        // Hash what landed on disk, not what came over the wire.
        let data = fs::read(&path)?;
        let checksum = sha256_checksum(&data);
        let size = fs::metadata(&path)?.len();
        debug!("{filename}: {size} bytes, {checksum}");

        Ok(ArchiveDescriptor {
            filename,
            checksum,
            size,
        })
    }
}
