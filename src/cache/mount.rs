//! Mount Module
//!
//! Binds single path segments to backends and routes keys to them.
//!
//! Routing is segment-exact: the key's leading segment must equal a mount
//! path, so a mount named `a` never intercepts keys for a mount named `ab`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{CacheError, Result};
use crate::store::Store;

/// Separator between key path segments.
pub const SEPARATOR: char = '/';

// == Mount ==
/// A mount path bound to its backend.
#[derive(Clone)]
pub struct Mount {
    path: String,
    store: Arc<dyn Store>,
}

impl Mount {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Returns true if `key` (already normalized) routes to this mount.
    pub fn owns(&self, key: &str) -> bool {
        leading_segment(key) == self.path
    }
}

impl fmt::Debug for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mount")
            .field("path", &self.path)
            .field("store", &self.store.kind())
            .finish()
    }
}

// == Mount Table ==
/// Immutable routing table, built once at cache construction.
#[derive(Debug, Default)]
pub struct MountTable {
    mounts: HashMap<String, Mount>,
}

impl MountTable {
    /// Builds a table from `(path, store)` pairs.
    ///
    /// Fails if a path is empty, contains a separator, or is registered twice.
    pub fn new<I>(mounts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Arc<dyn Store>)>,
    {
        let mut table = HashMap::new();
        for (path, store) in mounts {
            let path = normalize_mount_path(&path)?;
            if table.contains_key(&path) {
                return Err(CacheError::DuplicateMount(path));
            }
            table.insert(path.clone(), Mount { path, store });
        }
        Ok(Self { mounts: table })
    }

    // == Resolve ==
    /// Returns the mount responsible for `key` (already normalized).
    pub fn resolve(&self, key: &str) -> Result<&Mount> {
        self.mounts
            .get(leading_segment(key))
            .ok_or_else(|| CacheError::NoMount(key.to_string()))
    }

    /// Iterates mounts in path order.
    pub fn iter(&self) -> impl Iterator<Item = &Mount> {
        let mut mounts: Vec<&Mount> = self.mounts.values().collect();
        mounts.sort_by(|a, b| a.path.cmp(&b.path));
        mounts.into_iter()
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}

fn normalize_mount_path(path: &str) -> Result<String> {
    let trimmed = path.trim_matches(SEPARATOR);
    if trimmed.is_empty() || trimmed.contains(SEPARATOR) {
        return Err(CacheError::InvalidMount(path.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Returns the text before the first separator, after trimming separators.
pub fn leading_segment(key: &str) -> &str {
    let trimmed = key.trim_matches(SEPARATOR);
    match trimmed.split_once(SEPARATOR) {
        Some((segment, _)) => segment,
        None => trimmed,
    }
}
