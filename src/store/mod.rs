//! Product store — the on-device key-value collaborator.
//!
//! DESIGN
//! ======
//! The store keeps one serialized text blob per string key. The trait is
//! async and object-safe so `AppState` can hold `Arc<dyn ProductStore>`:
//! `FileStore` on the device, `MemoryStore` in tests. Callers treat every
//! failure the same way (log and keep serving from memory), so the error
//! type stays coarse.

pub mod file;
#[cfg(test)]
pub mod memory;

pub use file::FileStore;
#[cfg(test)]
pub use memory::MemoryStore;

/// Fixed key the product sequence is persisted under.
pub const PRODUCTS_KEY: &str = "products";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("blob encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// Read the blob at `key`. `None` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or read.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` at `key`, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; the previous blob is kept intact.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
