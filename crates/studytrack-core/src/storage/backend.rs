//! Key/value backend abstraction.
//!
//! The study store only ever needs string values addressed by a small fixed
//! set of keys, so any durable map can back it. Production uses SQLite
//! ([`super::SqliteBackend`]); tests use [`MemoryBackend`].

use std::collections::HashMap;

use crate::error::StorageError;

/// Durable string map with an explicit init step.
pub trait KvBackend {
    /// Prepare the backend (create tables, files). Called once by the store.
    fn init(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Get a value. `Ok(None)` means the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<B: KvBackend + ?Sized> KvBackend for Box<B> {
    fn init(&mut self) -> Result<(), StorageError> {
        (**self).init()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory backend. Counts writes so callers can assert on them.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-existing raw values, e.g. a corrupted blob.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            writes: 0,
        }
    }

    /// Number of `set`/`remove` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.writes += 1;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.writes += 1;
        self.entries.remove(key);
        Ok(())
    }
}
