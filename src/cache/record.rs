//! Record Module
//!
//! Defines the unit of storage: an opaque payload plus its metadata envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Metadata ==
/// Expiry and one-time-read metadata attached to every stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Creation timestamp, set once at write time
    pub created_at: DateTime<Utc>,
    /// End of the validity window, None = no expiry
    pub not_valid_after: Option<DateTime<Utc>>,
    /// Delete the record on its first successful read
    pub burn_after_reading: bool,
}

impl Metadata {
    /// Creates metadata for a record written at `created_at` with no expiry.
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            not_valid_after: None,
            burn_after_reading: false,
        }
    }

    /// Returns true while `now` is strictly before `not_valid_after`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.not_valid_after {
            Some(eol) => now < eol,
            None => true,
        }
    }
}

// == Record ==
/// The cached payload plus its metadata. The cache never inspects `data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub data: Vec<u8>,
    pub meta: Metadata,
}

impl Record {
    /// Creates a record stamped with the current time and no expiry.
    pub fn new(data: Vec<u8>) -> Self {
        Self::created_at(data, Utc::now())
    }

    pub fn created_at(data: Vec<u8>, created_at: DateTime<Utc>) -> Self {
        Self {
            data,
            meta: Metadata::new(created_at),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.meta.is_valid_at(now)
    }

    pub fn is_expired(&self) -> bool {
        !self.is_valid()
    }
}

// == Key Record ==
/// A `(key, record)` pair, the unit exchanged with a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    pub key: String,
    pub record: Record,
}

impl KeyRecord {
    pub fn new(key: impl Into<String>, record: Record) -> Self {
        Self {
            key: key.into(),
            record,
        }
    }
}
