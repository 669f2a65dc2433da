//! In-memory source used by tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{DirectoryLister, Fetcher};
use crate::error::FetchError;

/// Documents and listings held in maps, with a fetch counter
#[derive(Default)]
pub(crate) struct MemorySource {
    files: Mutex<HashMap<String, String>>,
    listings: HashMap<String, Vec<String>>,
    delays: HashMap<String, usize>,
    fetches: AtomicUsize,
    completed: Mutex<Vec<String>>,
}

impl MemorySource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_file(self, path: &str, text: &str) -> Self {
        self.put(path, text);
        self
    }

    pub(crate) fn with_listing(mut self, dir: &str, names: &[&str]) -> Self {
        self.listings.insert(
            dir.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    /// Make fetches of `path` yield `turns` extra times before finishing
    pub(crate) fn with_delay(mut self, path: &str, turns: usize) -> Self {
        self.delays.insert(path.to_string(), turns);
        self
    }

    /// Replace a file's text
    pub(crate) fn put(&self, path: &str, text: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), text.to_string());
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Fetched paths, in the order the fetches finished
    pub(crate) fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MemorySource {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        // Give concurrent loads a chance to interleave
        let turns = 1 + self.delays.get(path).copied().unwrap_or(0);
        for _ in 0..turns {
            tokio::task::yield_now().await;
        }
        self.completed.lock().unwrap().push(path.to_string());
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                path: path.to_string(),
            })
    }
}

#[async_trait]
impl DirectoryLister for MemorySource {
    async fn list(&self, dir: &str) -> Vec<String> {
        self.listings
            .get(dir.trim_end_matches('/'))
            .cloned()
            .unwrap_or_default()
    }
}
