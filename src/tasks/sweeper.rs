//! Eviction Sweeper
//!
//! Background task that periodically evicts expired records from every mount.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::stats::Counters;
use crate::cache::{Mount, MountTable};
use crate::error::{CacheError, Result};

// == Sweep Report ==
/// Outcome of sweeping one or more mounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Expired records removed
    pub deleted: u64,
    /// Expired records whose removal failed
    pub failed: u64,
    /// Records left in place because they are still valid
    pub valid: u64,
    /// Mounts skipped because they could not be locked, listed, or timed out
    pub skipped_mounts: u64,
}

impl SweepReport {
    fn merge(&mut self, other: SweepReport) {
        self.deleted += other.deleted;
        self.failed += other.failed;
        self.valid += other.valid;
        self.skipped_mounts += other.skipped_mounts;
    }
}

/// Spawns the background sweeper for a cache instance.
///
/// The task sleeps for `interval` (or until `shutdown` fires), then sweeps
/// every mount, each bounded by `timeout`. It exits promptly once `shutdown`
/// is cancelled; mount locks are guards, so an interrupted sweep never leaves
/// a mount locked.
///
/// # Arguments
/// * `mounts` - The cache's immutable mount table
/// * `interval` - Time between sweep cycles
/// * `timeout` - Upper bound for sweeping a single mount
/// * `shutdown` - Stops the loop when cancelled
///
/// # Returns
/// A JoinHandle that completes after the loop observes `shutdown`.
pub(crate) fn spawn_sweeper(
    mounts: Arc<MountTable>,
    counters: Arc<Counters>,
    interval: Duration,
    timeout: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting sweeper with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            let report = sweep_all(&mounts, &counters, timeout, &shutdown).await;
            if report.deleted > 0 || report.failed > 0 || report.skipped_mounts > 0 {
                info!(
                    deleted = report.deleted,
                    failed = report.failed,
                    valid = report.valid,
                    skipped_mounts = report.skipped_mounts,
                    "Sweep finished"
                );
            } else {
                debug!(valid = report.valid, "Sweep finished: no expired records found");
            }
        }

        info!("Sweeper stopped");
    })
}

/// Sweeps every mount once. Failures are logged and counted, never returned.
pub(crate) async fn sweep_all(
    mounts: &MountTable,
    counters: &Counters,
    timeout: Duration,
    cancel: &CancellationToken,
) -> SweepReport {
    let mut total = SweepReport::default();

    for mount in mounts.iter() {
        if cancel.is_cancelled() {
            break;
        }

        match tokio::time::timeout(timeout, sweep_mount(mount, cancel)).await {
            Ok(Ok(report)) => {
                debug!(
                    mount = mount.path(),
                    deleted = report.deleted,
                    failed = report.failed,
                    valid = report.valid,
                    "Swept mount"
                );
                total.merge(report);
            }
            Ok(Err(CacheError::Cancelled)) => {
                debug!(mount = mount.path(), "Sweep cancelled");
                total.skipped_mounts += 1;
            }
            Ok(Err(e)) => {
                error!(mount = mount.path(), "Sweep failed: {}", e);
                total.skipped_mounts += 1;
            }
            Err(_) => {
                warn!(mount = mount.path(), "Sweep timed out after {:?}", timeout);
                total.skipped_mounts += 1;
            }
        }
    }

    counters.record_sweep(total.deleted, total.failed);
    total
}

/// Locks one mount, lists its records and deletes the expired ones.
async fn sweep_mount(mount: &Mount, cancel: &CancellationToken) -> Result<SweepReport> {
    let mut guard = mount.store().lock(cancel).await?;
    let records = guard.list(mount.path()).await?;
    let now = Utc::now();
    let mut report = SweepReport::default();

    // list() may over-return, keep only keys this mount owns
    for kr in records.into_iter().filter(|kr| mount.owns(&kr.key)) {
        if cancel.is_cancelled() {
            debug!(mount = mount.path(), "Sweep interrupted by shutdown");
            break;
        }
        if kr.record.is_valid_at(now) {
            report.valid += 1;
            continue;
        }
        match guard.delete(&kr.key).await {
            Ok(()) => report.deleted += 1,
            Err(e) => {
                warn!(mount = mount.path(), key = %kr.key, "Eviction failed: {}", e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
