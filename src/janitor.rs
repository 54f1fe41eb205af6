//! Storage reclamation for produced files
//!
//! Two independent mechanisms keep the output directory small:
//!
//! - [`ExpiryScheduler`] arms one cancellable timer per produced file and deletes
//!   exactly that file when it fires.
//! - [`sweep_expired`] deletes every output file older than a threshold. It runs
//!   before each merge, once at startup, and periodically from
//!   [`spawn_periodic_sweep`], so files whose timer never fired (for example
//!   across a restart) are still reclaimed.
//!
//! All deletions are best-effort: a file that is already gone is not an error.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Extension of published output files
pub(crate) const OUTPUT_EXTENSION: &str = "mp4";

/// Extension of in-flight publish copies
pub(crate) const PARTIAL_EXTENSION: &str = "part";

/// Whether the sweep may delete `path`, judged by name alone
fn is_sweepable(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(OUTPUT_EXTENSION) | Some(PARTIAL_EXTENSION)
    )
}

/// Delete output files in `dir` last modified more than `max_age` ago
///
/// Only regular files ending in `.mp4` (or stale `.part` publish copies) are
/// considered; directories and other files are left alone. Errors are logged
/// and swallowed. Returns the number of files removed.
pub async fn sweep_expired(dir: &Path, max_age: Duration) -> usize {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return 0,
        Err(e) => {
            warn!(dir = ?dir, error = %e, "cannot read output directory for sweep");
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut removed = 0;

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(dir = ?dir, error = %e, "error while listing output directory");
                break;
            }
        };

        let path = entry.path();
        if !is_sweepable(&path) {
            continue;
        }

        let metadata = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };

        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();

        if age <= max_age {
            continue;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = ?path, age_secs = age.as_secs(), "swept expired output");
                removed += 1;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => debug!(path = ?path, error = %e, "failed to sweep output"),
        }
    }

    removed
}

/// Spawn a task that sweeps `dir` every `interval` until `shutdown` is cancelled
///
/// Returns `None` when `interval` is zero (periodic sweeping disabled).
pub fn spawn_periodic_sweep(
    dir: PathBuf,
    interval: Duration,
    max_age: Duration,
    shutdown: CancellationToken,
) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; startup already swept
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = sweep_expired(&dir, max_age).await;
                    if removed > 0 {
                        info!(removed, "periodic sweep removed expired outputs");
                    }
                }
                _ = shutdown.cancelled() => {
                    debug!("periodic sweep stopped");
                    break;
                }
            }
        }
    }))
}

/// Registry of pending per-file deletions
///
/// Each scheduled file gets its own timer task, keyed by path, which can be
/// cancelled individually or all at once during shutdown. Cancelled files stay
/// on disk for the sweep to collect.
#[derive(Debug, Clone, Default)]
pub struct ExpiryScheduler {
    pending: Arc<Mutex<HashMap<PathBuf, PendingDeletion>>>,
    next_id: Arc<AtomicU64>,
    shutdown: CancellationToken,
}

#[derive(Debug)]
struct PendingDeletion {
    id: u64,
    token: CancellationToken,
}

impl ExpiryScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete `path` after `delay`, unless cancelled first
    ///
    /// Scheduling a path that already has a pending timer replaces that timer.
    pub async fn schedule(&self, path: PathBuf, delay: Duration) -> JoinHandle<()> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = self.shutdown.child_token();

        let replaced = self.pending.lock().await.insert(
            path.clone(),
            PendingDeletion {
                id,
                token: token.clone(),
            },
        );
        if let Some(previous) = replaced {
            previous.token.cancel();
        }

        let pending = self.pending.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    match tokio::fs::remove_file(&path).await {
                        Ok(()) => debug!(path = ?path, "deleted expired output"),
                        Err(e) if e.kind() == ErrorKind::NotFound => {}
                        Err(e) => debug!(path = ?path, error = %e, "failed to delete expired output"),
                    }
                }
                _ = token.cancelled() => {
                    debug!(path = ?path, "expiry cancelled");
                }
            }

            let mut pending = pending.lock().await;
            if pending.get(&path).is_some_and(|p| p.id == id) {
                pending.remove(&path);
            }
        })
    }

    /// Cancel the pending deletion of `path`, returning whether one existed
    pub async fn cancel(&self, path: &Path) -> bool {
        match self.pending.lock().await.remove(path) {
            Some(pending) => {
                pending.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether `path` has a deletion pending
    pub async fn is_scheduled(&self, path: &Path) -> bool {
        self.pending.lock().await.contains_key(path)
    }

    /// Number of deletions still pending
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Cancel every pending deletion
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let count = {
            let mut pending = self.pending.lock().await;
            let count = pending.len();
            pending.clear();
            count
        };
        if count > 0 {
            info!(count, "cancelled pending output deletions");
        }
    }
}
