//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Seconds between background sweep cycles
    pub sweep_interval: u64,
    /// Upper bound in seconds for sweeping a single mount
    pub sweep_timeout: u64,
    /// Mount path served by the in-memory backend
    pub memory_mount: String,
    /// Mount path served by the document backend
    pub persist_mount: String,
    /// Location of the document database file
    pub document_path: PathBuf,
    /// Collection (table) holding cache documents
    pub document_collection: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `SWEEP_TIMEOUT` - Per-mount sweep bound in seconds (default: 30)
    /// - `MEMORY_MOUNT` - In-memory mount path (default: "memory")
    /// - `PERSIST_MOUNT` - Document mount path (default: "persist")
    /// - `DOCUMENT_STORE_PATH` - Database file (default: "data/cache.redb")
    /// - `DOCUMENT_COLLECTION` - Collection name (default: "cache")
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sweep_interval: parse_var("SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
            sweep_timeout: parse_var("SWEEP_TIMEOUT").unwrap_or(defaults.sweep_timeout),
            memory_mount: env::var("MEMORY_MOUNT").unwrap_or(defaults.memory_mount),
            persist_mount: env::var("PERSIST_MOUNT").unwrap_or(defaults.persist_mount),
            document_path: env::var("DOCUMENT_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.document_path),
            document_collection: env::var("DOCUMENT_COLLECTION")
                .unwrap_or(defaults.document_collection),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval)
    }

    pub fn sweep_timeout(&self) -> Duration {
        Duration::from_secs(self.sweep_timeout)
    }
}

fn parse_var(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sweep_interval: 60,
            sweep_timeout: 30,
            memory_mount: "memory".to_string(),
            persist_mount: "persist".to_string(),
            document_path: PathBuf::from("data/cache.redb"),
            document_collection: "cache".to_string(),
        }
    }
}
