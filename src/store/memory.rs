//! In-Memory Store Module
//!
//! Reference backend: a single mutex-guarded map from key to record.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::cache::{KeyRecord, Record};
use crate::error::{CacheError, Result};
use crate::store::{Store, StoreGuard};

// == Memory Store ==
/// In-memory backend, the correctness reference for other backends.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn lock<'a>(&'a self, cancel: &CancellationToken) -> Result<Box<dyn StoreGuard + 'a>> {
        let entries = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CacheError::Cancelled),
            entries = self.entries.lock() => entries,
        };
        Ok(Box::new(MemoryGuard { entries }))
    }
}

struct MemoryGuard<'a> {
    entries: MutexGuard<'a, HashMap<String, Record>>,
}

#[async_trait]
impl StoreGuard for MemoryGuard<'_> {
    async fn put(&mut self, record: KeyRecord) -> Result<()> {
        // The map takes ownership; callers keep no alias into it
        self.entries.insert(record.key, record.record);
        Ok(())
    }

    async fn get(&mut self, key: &str) -> Result<Option<KeyRecord>> {
        Ok(self
            .entries
            .get(key)
            .map(|record| KeyRecord::new(key, record.clone())))
    }

    async fn list(&mut self, prefix: &str) -> Result<Vec<KeyRecord>> {
        Ok(self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, record)| KeyRecord::new(key.clone(), record.clone()))
            .collect())
    }

    async fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
