mod file;
mod memory;

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppResult;

pub use file::FileStore;
pub use memory::MemoryStore;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>>;

    fn set(&self, key: &str, value: &[u8]) -> AppResult<()>;

    /// Removing an absent key succeeds.
    fn remove(&self, key: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PersistentStore {
    inner: Arc<dyn KeyValueStore>,
}

impl PersistentStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    pub fn read(&self, key: &str) -> Option<Vec<u8>> {
        match self.inner.get(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "storage read failed");
                None
            }
        }
    }

    pub fn write(&self, key: &str, value: &[u8]) {
        if let Err(err) = self.inner.set(key, value) {
            tracing::warn!(key, bytes = value.len(), error = %err, "storage write failed");
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(err) = self.inner.remove(key) {
            tracing::warn!(key, error = %err, "storage remove failed");
        }
    }

    /// Malformed data is logged and treated as absent.
    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read(key)?;
        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "discarding malformed stored value");
                None
            }
        }
    }

    pub fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(raw) => self.write(key, &raw),
            Err(err) => tracing::warn!(key, error = %err, "failed to encode value for storage"),
        }
    }
}
