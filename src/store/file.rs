//! File-backed store — one file per key under a root directory.
//!
//! DESIGN
//! ======
//! Writes land in a temporary sibling file first and are renamed into place,
//! so a crash mid-write never leaves a torn blob at the key's path. Reads
//! map a missing file to `None`.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use super::{ProductStore, StoreError};

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

#[async_trait]
impl ProductStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.blob_path(key)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let tmp = self.root.join(format!("{key}.json.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, self.blob_path(key)).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
