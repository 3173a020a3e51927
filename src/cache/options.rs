//! Write Options Module
//!
//! Modifiers applied in order to a freshly built record before it is persisted.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::Record;
use crate::error::{CacheError, Result};

// == Write Option ==
/// A single modifier in the write pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOption {
    /// Expire `Duration` after the record's creation time
    Ttl(Duration),
    /// Expire at an absolute point in time
    Eol(DateTime<Utc>),
    /// Delete the record on its first successful read
    BurnAfterReading,
}

impl WriteOption {
    // == Apply ==
    /// Applies this option to `record`.
    ///
    /// Fails with `DuplicateExpiry` if an earlier option already set an expiry.
    pub fn apply(&self, record: &mut Record) -> Result<()> {
        match *self {
            WriteOption::Ttl(ttl) => {
                // Saturate instead of overflowing on absurd durations
                let eol = chrono::Duration::from_std(ttl)
                    .ok()
                    .and_then(|ttl| record.meta.created_at.checked_add_signed(ttl))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                set_eol(record, eol)
            }
            WriteOption::Eol(eol) => set_eol(record, eol),
            WriteOption::BurnAfterReading => {
                record.meta.burn_after_reading = true;
                Ok(())
            }
        }
    }
}

fn set_eol(record: &mut Record, eol: DateTime<Utc>) -> Result<()> {
    if record.meta.not_valid_after.is_some() {
        return Err(CacheError::DuplicateExpiry);
    }
    record.meta.not_valid_after = Some(eol);
    Ok(())
}

/// Expire the record `ttl` after it is written.
pub fn with_ttl(ttl: Duration) -> WriteOption {
    WriteOption::Ttl(ttl)
}

/// Expire the record at `eol`.
pub fn with_eol(eol: DateTime<Utc>) -> WriteOption {
    WriteOption::Eol(eol)
}

/// Make the record single-use.
pub fn with_burn_after_reading() -> WriteOption {
    WriteOption::BurnAfterReading
}

/// Applies `options` in order, stopping at the first failure.
pub(crate) fn apply_all<'a>(
    record: &mut Record,
    options: impl IntoIterator<Item = &'a WriteOption>,
) -> Result<()> {
    options.into_iter().try_for_each(|opt| opt.apply(record))
}
