//! Document Store Module
//!
//! Persistent backend keeping one JSON document per cache key in an embedded
//! redb database. Each collection is a table; documents carry the metadata
//! envelope so records survive a restart.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::{KeyRecord, Metadata, Record};
use crate::error::{CacheError, Result};
use crate::store::{Store, StoreGuard};

/// Error type for document store operations
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::DatabaseError),
    #[error("redb storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("redb table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("redb transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
    #[error("redb commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("document encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redb::TransactionError> for DocumentError {
    fn from(e: redb::TransactionError) -> Self {
        Self::Transaction(Box::new(e))
    }
}

impl From<DocumentError> for CacheError {
    fn from(e: DocumentError) -> Self {
        CacheError::Backend(e.to_string())
    }
}

type DocumentResult<T> = std::result::Result<T, DocumentError>;

// == Stored Document ==
/// On-disk shape of a cached record.
#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    key: String,
    #[serde(with = "base64_payload")]
    data: Vec<u8>,
    created_at: DateTime<Utc>,
    not_valid_after: Option<DateTime<Utc>>,
    burn_after_reading: bool,
}

/// Payloads are stored as base64 strings rather than JSON number arrays.
mod base64_payload {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}

impl From<&KeyRecord> for StoredDocument {
    fn from(kr: &KeyRecord) -> Self {
        Self {
            key: kr.key.clone(),
            data: kr.record.data.clone(),
            created_at: kr.record.meta.created_at,
            not_valid_after: kr.record.meta.not_valid_after,
            burn_after_reading: kr.record.meta.burn_after_reading,
        }
    }
}

impl From<StoredDocument> for KeyRecord {
    fn from(doc: StoredDocument) -> Self {
        KeyRecord::new(
            doc.key,
            Record {
                data: doc.data,
                meta: Metadata {
                    created_at: doc.created_at,
                    not_valid_after: doc.not_valid_after,
                    burn_after_reading: doc.burn_after_reading,
                },
            },
        )
    }
}

// == Document Store ==
/// Persistent backend over an embedded redb database.
pub struct DocumentStore {
    db: Arc<Database>,
    collection: Arc<str>,
    exclusive: Arc<Mutex<()>>,
}

impl DocumentStore {
    /// Open (or create) the database at `path` and its `collection` table.
    pub fn open(path: impl AsRef<Path>, collection: &str) -> DocumentResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Create the table eagerly so later read txns don't fail
        let write_txn = db.begin_write()?;
        {
            let _t = write_txn.open_table(table(collection))?;
        }
        write_txn.commit()?;

        debug!("Opened document store {} (collection {})", path.display(), collection);
        Ok(Self {
            db: Arc::new(db),
            collection: Arc::from(collection),
            exclusive: Arc::new(Mutex::new(())),
        })
    }
}

fn table(collection: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(collection)
}

#[async_trait]
impl Store for DocumentStore {
    fn kind(&self) -> &'static str {
        "document"
    }

    async fn lock<'a>(&'a self, cancel: &CancellationToken) -> Result<Box<dyn StoreGuard + 'a>> {
        let held = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CacheError::Cancelled),
            held = self.exclusive.clone().lock_owned() => held,
        };
        Ok(Box::new(DocumentGuard {
            held: Arc::new(held),
            db: self.db.clone(),
            collection: self.collection.clone(),
        }))
    }
}

/// The mount lock is shared with every in-flight blocking job, so it is only
/// released once the guard is dropped and all database work has finished.
struct DocumentGuard {
    held: Arc<OwnedMutexGuard<()>>,
    db: Arc<Database>,
    collection: Arc<str>,
}

impl DocumentGuard {
    /// Runs blocking database work off the async executor.
    ///
    /// The job keeps the mount lock alive even if the calling future is dropped.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database, &str) -> DocumentResult<T> + Send + 'static,
    {
        let held = self.held.clone();
        let db = self.db.clone();
        let collection = self.collection.clone();
        let result = tokio::task::spawn_blocking(move || {
            let result = f(&db, &collection);
            drop(held);
            result
        })
        .await
        .map_err(DocumentError::from)?;
        Ok(result?)
    }
}

#[async_trait]
impl StoreGuard for DocumentGuard {
    async fn put(&mut self, record: KeyRecord) -> Result<()> {
        let bytes =
            serde_json::to_vec(&StoredDocument::from(&record)).map_err(DocumentError::from)?;
        self.blocking(move |db, collection| {
            let write_txn = db.begin_write()?;
            {
                let mut t = write_txn.open_table(table(collection))?;
                t.insert(record.key.as_str(), bytes.as_slice())?;
            }
            write_txn.commit()?;
            Ok(())
        })
        .await
    }

    async fn get(&mut self, key: &str) -> Result<Option<KeyRecord>> {
        let key = key.to_string();
        self.blocking(move |db, collection| {
            let read_txn = db.begin_read()?;
            let t = read_txn.open_table(table(collection))?;
            let Some(val) = t.get(key.as_str())? else {
                return Ok(None);
            };
            let doc: StoredDocument = serde_json::from_slice(val.value())?;
            Ok(Some(doc.into()))
        })
        .await
    }

    async fn list(&mut self, prefix: &str) -> Result<Vec<KeyRecord>> {
        let prefix = prefix.to_string();
        self.blocking(move |db, collection| {
            let read_txn = db.begin_read()?;
            let t = read_txn.open_table(table(collection))?;
            let mut result = Vec::new();
            for entry in t.range(prefix.as_str()..)? {
                let (key, val) = entry?;
                let key = key.value();
                // Keys are ordered, so the first mismatch ends the prefix run
                if !key.starts_with(prefix.as_str()) {
                    break;
                }
                match serde_json::from_slice::<StoredDocument>(val.value()) {
                    Ok(doc) => result.push(doc.into()),
                    Err(e) => warn!("Skipping undecodable document '{}': {}", key, e),
                }
            }
            Ok(result)
        })
        .await
    }

    async fn delete(&mut self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.blocking(move |db, collection| {
            let write_txn = db.begin_write()?;
            {
                let mut t = write_txn.open_table(table(collection))?;
                t.remove(key.as_str())?;
            }
            write_txn.commit()?;
            Ok(())
        })
        .await
    }
}
