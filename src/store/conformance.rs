//! Backend conformance suite.
//!
//! Every `Store` implementation must pass these checks before it is mounted.
//! Each backend's test module calls them with a fresh, empty store.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::cache::{KeyRecord, Record};
use crate::error::CacheError;
use crate::store::Store;

fn key_record(key: &str, data: &[u8]) -> KeyRecord {
    KeyRecord::new(key, Record::new(data.to_vec()))
}

pub async fn round_trip(store: &dyn Store) {
    let cancel = CancellationToken::new();
    let mut guard = store.lock(&cancel).await.unwrap();

    guard.put(key_record("m/a", b"alpha")).await.unwrap();
    let found = guard.get("m/a").await.unwrap().expect("record should exist");

    assert_eq!(found.key, "m/a");
    assert_eq!(found.record.data, b"alpha");
}

pub async fn get_missing_is_none(store: &dyn Store) {
    let cancel = CancellationToken::new();
    let mut guard = store.lock(&cancel).await.unwrap();

    assert!(guard.get("m/missing").await.unwrap().is_none());
}

pub async fn overwrite(store: &dyn Store) {
    let cancel = CancellationToken::new();
    let mut guard = store.lock(&cancel).await.unwrap();

    guard.put(key_record("m/a", b"one")).await.unwrap();
    guard.put(key_record("m/a", b"two")).await.unwrap();

    let found = guard.get("m/a").await.unwrap().unwrap();
    assert_eq!(found.record.data, b"two");
    assert_eq!(guard.list("m/").await.unwrap().len(), 1);
}

pub async fn delete(store: &dyn Store) {
    let cancel = CancellationToken::new();
    let mut guard = store.lock(&cancel).await.unwrap();

    guard.put(key_record("m/a", b"alpha")).await.unwrap();
    guard.delete("m/a").await.unwrap();
    assert!(guard.get("m/a").await.unwrap().is_none());

    // Deleting an absent key is not an error
    guard.delete("m/a").await.unwrap();
    guard.delete("m/never").await.unwrap();
}

pub async fn list_prefix(store: &dyn Store) {
    let cancel = CancellationToken::new();
    let mut guard = store.lock(&cancel).await.unwrap();

    guard.put(key_record("m/a", b"1")).await.unwrap();
    guard.put(key_record("m/b", b"2")).await.unwrap();
    guard.put(key_record("mx/c", b"3")).await.unwrap();
    guard.put(key_record("n/d", b"4")).await.unwrap();

    // Callers re-filter, so only require the matching keys to be present
    let mut keys: Vec<String> = guard
        .list("m/")
        .await
        .unwrap()
        .into_iter()
        .map(|kr| kr.key)
        .filter(|key| key.starts_with("m/"))
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["m/a".to_string(), "m/b".to_string()]);

    let all = guard.list("").await.unwrap();
    assert_eq!(all.len(), 4);
}

pub async fn metadata_preserved(store: &dyn Store) {
    let cancel = CancellationToken::new();
    let mut guard = store.lock(&cancel).await.unwrap();

    let now = Utc::now();
    let mut record = Record::created_at(b"meta".to_vec(), now);
    record.meta.not_valid_after = Some(now + chrono::Duration::seconds(30));
    record.meta.burn_after_reading = true;
    guard.put(KeyRecord::new("m/meta", record.clone())).await.unwrap();

    let found = guard.get("m/meta").await.unwrap().unwrap();
    assert_eq!(found.record, record);
}

pub async fn copy_isolation(store: &dyn Store) {
    let cancel = CancellationToken::new();
    let mut guard = store.lock(&cancel).await.unwrap();

    let mut written = key_record("m/a", b"abc");
    guard.put(written.clone()).await.unwrap();
    written.record.data[0] = b'X';

    let mut read = guard.get("m/a").await.unwrap().unwrap();
    read.record.data.clear();
    read.record.meta.not_valid_after = Some(Utc::now());

    let mut listed = guard.list("m/").await.unwrap();
    for kr in &mut listed {
        kr.record.data.push(b'!');
    }

    let again = guard.get("m/a").await.unwrap().unwrap();
    assert_eq!(again.record.data, b"abc");
    assert!(again.record.meta.not_valid_after.is_none());
}

pub async fn cancelled_lock(store: &dyn Store) {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = store.lock(&cancel).await;
    assert!(matches!(result, Err(CacheError::Cancelled)));
}

/// A second locker waits for the first guard to drop, and can be cancelled
/// while waiting.
pub async fn lock_is_exclusive(store: &dyn Store) {
    let cancel = CancellationToken::new();
    let guard = store.lock(&cancel).await.unwrap();

    let waiting = CancellationToken::new();
    let canceller = waiting.clone();
    let cancel_soon = async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    };
    let (result, ()) = tokio::join!(store.lock(&waiting), cancel_soon);
    assert!(matches!(result, Err(CacheError::Cancelled)));

    drop(guard);
    assert!(store.lock(&cancel).await.is_ok());
}

/// Concurrent writers to the same key never interleave; one value wins.
pub async fn concurrent_writers<S: Store>(store: Arc<S>) {
    let mut handles = Vec::new();
    for i in 0..16u8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let cancel = CancellationToken::new();
            let mut guard = store.lock(&cancel).await.unwrap();
            guard.put(key_record("m/shared", &[i; 64])).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let cancel = CancellationToken::new();
    let mut guard = store.lock(&cancel).await.unwrap();
    let found = guard.get("m/shared").await.unwrap().unwrap();
    let first = found.record.data[0];
    assert_eq!(found.record.data, vec![first; 64]);
}
