use std::{
    collections::HashMap,
    io,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use super::KeyValueStore;
use crate::error::AppResult;

pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    available: AtomicBool,
    quota_bytes: Option<usize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            quota_bytes: None,
        }
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::new()
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(io::Error::other("storage unavailable").into())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>> {
        self.ensure_available()?;
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> AppResult<()> {
        self.ensure_available()?;
        let mut entries = self.lock();
        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(io::Error::new(io::ErrorKind::StorageFull, "quota exceeded").into());
            }
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.ensure_available()?;
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_rejects_oversized_write() {
        let store = MemoryStore::with_quota(16);
        store.set("cart", b"[]").unwrap();
        let err = store.set("cart", &[b'x'; 64]).unwrap_err();
        assert!(matches!(err, crate::error::AppError::Storage(_)));
        assert_eq!(store.get("cart").unwrap().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn overwrite_does_not_count_previous_value() {
        let store = MemoryStore::with_quota(12);
        store.set("cart", b"12345678").unwrap();
        store.set("cart", b"87654321").unwrap();
    }
}
