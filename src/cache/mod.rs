//! Cache Module
//!
//! Mountable key/value cache: records with expiry and burn-after-reading,
//! segment-exact routing to pluggable backends, and the facade tying them together.

mod facade;
mod mount;
mod options;
mod record;
pub(crate) mod stats;


// Re-export public types
pub use facade::{Cache, CacheBuilder};
pub use mount::{leading_segment, Mount, MountTable, SEPARATOR};
pub use options::{with_burn_after_reading, with_eol, with_ttl, WriteOption};
pub use record::{KeyRecord, Metadata, Record};
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 1024;
