//! In-memory store for tests.
//!
//! DESIGN
//! ======
//! A plain map behind a mutex, plus failure injection so tests can exercise
//! the log-and-keep-serving paths the way an unreachable device store would.

use std::collections::HashMap;
use std::io::{Error as IoError, ErrorKind};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{ProductStore, StoreError};

fn unavailable() -> StoreError {
    StoreError::Io(IoError::new(ErrorKind::ConnectionRefused, "store unavailable"))
}

pub struct MemoryStore {
    blobs: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    fail: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self { blobs: Mutex::new(HashMap::new()), writes: AtomicUsize::new(0), fail: false }
    }

    /// A store that fails every call, standing in for an unreachable device.
    #[must_use]
    pub fn failing() -> Self {
        Self { fail: true, ..Self::new() }
    }

    /// Number of successful `set` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail {
            return Err(unavailable());
        }
        let blobs = self.blobs.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail {
            return Err(unavailable());
        }
        let mut blobs = self.blobs.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        blobs.insert(key.to_owned(), value.to_owned());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = MemoryStore::new();
        store.set("products", "[]").await.unwrap();
        assert_eq!(store.get("products").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn get_missing_key_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get("products").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failing_store_errors_on_both_calls() {
        let store = MemoryStore::failing();
        assert!(store.get("products").await.is_err());
        assert!(store.set("products", "[]").await.is_err());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn write_count_tracks_successful_sets() {
        let store = MemoryStore::new();
        store.set("products", "a").await.unwrap();
        store.set("products", "b").await.unwrap();
        assert_eq!(store.write_count(), 2);
    }
}
