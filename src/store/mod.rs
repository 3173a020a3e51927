//! Store Module
//!
//! The contract every cache backend implements, plus the bundled backends.
//!
//! # Backends
//! - `MemoryStore`: mutex-guarded map, the correctness reference
//! - `DocumentStore`: JSON documents in an embedded redb database

mod document;
mod memory;

#[cfg(test)]
pub(crate) mod conformance;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::cache::KeyRecord;
use crate::error::Result;

pub use document::{DocumentError, DocumentStore};
pub use memory::MemoryStore;

// == Store ==
/// A pluggable cache backend.
///
/// All data access goes through the guard returned by [`Store::lock`], so a
/// backend can never be touched without holding its exclusive lock. Dropping
/// the guard releases the lock.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Short backend name used in logs.
    fn kind(&self) -> &'static str;

    /// Acquires exclusive access to the backend.
    ///
    /// Returns `CacheError::Cancelled` without touching the backend if
    /// `cancel` fires before the lock is acquired.
    async fn lock<'a>(&'a self, cancel: &CancellationToken) -> Result<Box<dyn StoreGuard + 'a>>;
}

// == Store Guard ==
/// Exclusive, locked access to a backend for one logical operation.
///
/// Records passed in and handed out are owned values; mutating them never
/// affects backend state.
#[async_trait]
pub trait StoreGuard: Send {
    /// Inserts or replaces the record stored under `record.key`.
    async fn put(&mut self, record: KeyRecord) -> Result<()>;

    /// Returns the stored record, or `None` if the key is absent.
    async fn get(&mut self, key: &str) -> Result<Option<KeyRecord>>;

    /// Returns records whose key starts with `prefix`.
    ///
    /// Backends without prefix search may return more; callers re-filter.
    async fn list(&mut self, prefix: &str) -> Result<Vec<KeyRecord>>;

    /// Removes the record. Deleting an absent key is not an error.
    async fn delete(&mut self, key: &str) -> Result<()>;
}
