use crate::{FetchError, Fetcher};
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves fixed bodies from memory and records every requested URL.
#[derive(Default)]
pub struct MemoryFetcher {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.insert(url, body);
        self
    }

    pub fn insert(&mut self, url: &str, body: &[u8]) {
        self.bodies.insert(url.to_owned(), body.to_vec());
    }

    /// URLs requested so far, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| *u == url).count()
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_owned());
        }
        tracing::debug!("GET {url} (memory)");
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_owned()))
    }
}
