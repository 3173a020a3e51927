//! Cache Facade Module
//!
//! Public write/read/delete API. Each operation resolves the key's mount,
//! takes that mount's lock and delegates to its backend; there is no
//! cache-wide lock, so different mounts proceed in parallel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::options::apply_all;
use crate::cache::stats::Counters;
use crate::cache::{
    CacheStats, KeyRecord, Metadata, MountTable, Record, WriteOption, MAX_KEY_LENGTH, SEPARATOR,
};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::store::Store;
use crate::tasks::{spawn_sweeper, sweep_all, SweepReport};

// == Cache Builder ==
/// Collects mounts and sweeper settings, then starts a [`Cache`].
pub struct CacheBuilder {
    mounts: Vec<(String, Arc<dyn Store>)>,
    sweep_interval: Duration,
    sweep_timeout: Duration,
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CacheBuilder {
    /// Takes sweeper settings from `config`. Mounts are added separately.
    pub fn from_config(config: &Config) -> Self {
        Self {
            mounts: Vec::new(),
            sweep_interval: config.sweep_interval(),
            sweep_timeout: config.sweep_timeout(),
        }
    }

    /// Binds `path` to a backend.
    pub fn mount(self, path: impl Into<String>, store: impl Store) -> Self {
        self.mount_shared(path, Arc::new(store))
    }

    /// Binds `path` to an already shared backend.
    pub fn mount_shared(mut self, path: impl Into<String>, store: Arc<dyn Store>) -> Self {
        self.mounts.push((path.into(), store));
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn sweep_timeout(mut self, timeout: Duration) -> Self {
        self.sweep_timeout = timeout;
        self
    }

    // == Build ==
    /// Validates the mount table and starts the background sweeper.
    ///
    /// The sweeper runs until `shutdown` is cancelled. Must be called from
    /// within a tokio runtime.
    pub fn build(self, shutdown: CancellationToken) -> Result<Cache> {
        let mounts = Arc::new(MountTable::new(self.mounts)?);
        let counters = Arc::new(Counters::default());

        let sweeper = spawn_sweeper(
            mounts.clone(),
            counters.clone(),
            self.sweep_interval,
            self.sweep_timeout,
            shutdown.clone(),
        );

        Ok(Cache {
            mounts,
            counters,
            sweep_timeout: self.sweep_timeout,
            shutdown,
            sweeper: Arc::new(Mutex::new(Some(sweeper))),
        })
    }
}

// == Cache ==
/// The cache facade. Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct Cache {
    mounts: Arc<MountTable>,
    counters: Arc<Counters>,
    sweep_timeout: Duration,
    shutdown: CancellationToken,
    sweeper: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Cache {
    pub fn builder() -> CacheBuilder {
        CacheBuilder::default()
    }

    // == Write ==
    /// Stores `data` under `key` after applying `options` in order.
    ///
    /// An option error aborts before any backend is touched. A record that is
    /// already expired once the options are applied is silently dropped.
    ///
    /// # Arguments
    /// * `cancel` - Aborts the write if fired before the mount lock is held
    /// * `key` - Cache key; its leading segment selects the mount
    /// * `data` - Opaque payload
    /// * `options` - Expiry and one-time-read modifiers
    pub async fn write(
        &self,
        cancel: &CancellationToken,
        key: &str,
        data: impl Into<Vec<u8>>,
        options: &[WriteOption],
    ) -> Result<()> {
        let key = normalize_key(key)?;

        let mut record = Record::new(data.into());
        apply_all(&mut record, options)?;
        if record.is_expired() {
            debug!(key = %key, "Dropping write of already expired record");
            self.counters.record_skipped_write();
            return Ok(());
        }

        let mount = self.mounts.resolve(&key)?;
        let mut guard = mount.store().lock(cancel).await?;
        guard.put(KeyRecord::new(key.as_str(), record)).await?;
        drop(guard);

        debug!(key = %key, mount = mount.path(), "Wrote record");
        self.counters.record_write();
        Ok(())
    }

    // == Read ==
    /// Returns the payload and metadata of the live record stored under `key`.
    ///
    /// Missing and expired records both yield `CacheError::NotFound`. A
    /// burn-after-reading record is deleted before the mount lock is released,
    /// so no other reader can observe it again.
    pub async fn read(&self, cancel: &CancellationToken, key: &str) -> Result<(Vec<u8>, Metadata)> {
        let key = normalize_key(key)?;
        let mount = self.mounts.resolve(&key)?;
        let mut guard = mount.store().lock(cancel).await?;

        let record = match guard.get(&key).await? {
            Some(found) if found.record.is_valid() => found.record,
            _ => {
                self.counters.record_miss();
                return Err(CacheError::NotFound(key));
            }
        };

        if record.meta.burn_after_reading {
            guard.delete(&key).await?;
            self.counters.record_burn();
            debug!(key = %key, "Burned record after reading");
        }
        drop(guard);

        self.counters.record_hit();
        Ok((record.data, record.meta))
    }

    // == Delete ==
    /// Removes the record stored under `key`. A missing key is not an error.
    pub async fn delete(&self, cancel: &CancellationToken, key: &str) -> Result<()> {
        let key = normalize_key(key)?;
        let mount = self.mounts.resolve(&key)?;
        let mut guard = mount.store().lock(cancel).await?;
        guard.delete(&key).await?;
        drop(guard);

        debug!(key = %key, mount = mount.path(), "Deleted record");
        self.counters.record_delete();
        Ok(())
    }

    // == Sweep ==
    /// Runs one eviction cycle over every mount now, outside the regular schedule.
    pub async fn sweep(&self, cancel: &CancellationToken) -> SweepReport {
        sweep_all(&self.mounts, &self.counters, self.sweep_timeout, cancel).await
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Mount paths in sorted order.
    pub fn mounts(&self) -> Vec<String> {
        self.mounts.iter().map(|m| m.path().to_string()).collect()
    }

    // == Shutdown ==
    /// Stops the sweeper and waits for it to exit. Backends are left open.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let handle = self.sweeper.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Sweeper task ended abnormally: {}", e);
            }
        }
    }
}

/// Trims separators and enforces key limits.
fn normalize_key(key: &str) -> Result<String> {
    let trimmed = key.trim_matches(SEPARATOR);
    if trimmed.is_empty() {
        return Err(CacheError::InvalidKey("key is empty".to_string()));
    }
    if trimmed.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}
