//! Mountable Cache - A key/value cache routed over pluggable backends
//!
//! Records carry an optional expiry and a burn-after-reading flag; a
//! background sweeper evicts expired records from every mount.

pub mod cache;
pub mod config;
pub mod error;
pub mod store;
pub mod tasks;

pub use cache::{with_burn_after_reading, with_eol, with_ttl, Cache, CacheBuilder, WriteOption};
pub use config::Config;
pub use error::{CacheError, Result};
