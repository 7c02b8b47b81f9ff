//! Debounced, per-profile re-embedding after profile writes.
//!
//! Each profile has at most one pending refresh. Scheduling again within the
//! settle window aborts the pending task and starts a fresh timer, so a burst
//! of edits costs a single embedding call.

use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::{lock_db, refresh_profile, store, RefreshOutcome};
use crate::embedding::EmbeddingProvider;

struct PendingRefresh {
    generation: u64,
    handle: JoinHandle<()>,
}

type PendingMap = Arc<Mutex<HashMap<String, PendingRefresh>>>;

pub struct RefreshScheduler {
    db: Arc<Mutex<Connection>>,
    provider: Arc<dyn EmbeddingProvider>,
    debounce: Duration,
    snapshot_chars: usize,
    pending: PendingMap,
    generation: AtomicU64,
}

impl RefreshScheduler {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        provider: Arc<dyn EmbeddingProvider>,
        debounce: Duration,
        snapshot_chars: usize,
    ) -> Self {
        Self {
            db,
            provider,
            debounce,
            snapshot_chars,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Schedule a refresh of `profile_id` after the settle delay.
    ///
    /// Never blocks on the embedding call. Outside a Tokio runtime the
    /// request is dropped with a warning; the profile stays stale until the
    /// next write or backfill.
    pub fn schedule(&self, profile_id: &str) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(profile_id, "no async runtime, refresh not scheduled");
            return;
        };

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let Ok(mut pending) = self.pending.lock() else {
            tracing::warn!(profile_id, "scheduler state poisoned, refresh not scheduled");
            return;
        };

        if let Some(previous) = pending.remove(profile_id) {
            previous.handle.abort();
            tracing::debug!(profile_id, "pending refresh replaced");
        }

        let task = RefreshTask {
            db: Arc::clone(&self.db),
            provider: Arc::clone(&self.provider),
            pending: Arc::clone(&self.pending),
            profile_id: profile_id.to_string(),
            generation,
            debounce: self.debounce,
            snapshot_chars: self.snapshot_chars,
        };
        let handle = runtime.spawn(task.run());
        pending.insert(profile_id.to_string(), PendingRefresh { generation, handle });
    }

    /// Number of refreshes still waiting out their settle delay.
    pub fn pending(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Cancel every pending timer and run those refreshes now.
    ///
    /// Returns the number of profiles whose embedding was updated. A failing
    /// profile is logged and skipped; the rest still run. Used at shutdown so
    /// no scheduled work is lost.
    pub async fn flush(&self) -> anyhow::Result<usize> {
        let drained: Vec<String> = {
            let mut pending = self
                .pending
                .lock()
                .map_err(|e| anyhow::anyhow!("scheduler state poisoned: {e}"))?;
            pending
                .drain()
                .map(|(id, entry)| {
                    entry.handle.abort();
                    id
                })
                .collect()
        };

        let mut updated = 0;
        for profile_id in drained {
            let db = Arc::clone(&self.db);
            let provider = Arc::clone(&self.provider);
            let chars = self.snapshot_chars;
            let id = profile_id.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                refresh_profile(&db, provider.as_ref(), &id, chars)
            })
            .await;
            match outcome {
                Ok(Ok(RefreshOutcome::Updated)) => updated += 1,
                Ok(Ok(other)) => {
                    tracing::debug!(profile_id = %profile_id, outcome = ?other, "flushed refresh skipped")
                }
                Ok(Err(e)) => {
                    tracing::warn!(profile_id = %profile_id, error = %e, "flushed refresh failed")
                }
                Err(e) => {
                    tracing::warn!(profile_id = %profile_id, error = %e, "flushed refresh task failed")
                }
            }
        }
        Ok(updated)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            for (_, entry) in pending.drain() {
                entry.handle.abort();
            }
        }
    }
}

struct RefreshTask {
    db: Arc<Mutex<Connection>>,
    provider: Arc<dyn EmbeddingProvider>,
    pending: PendingMap,
    profile_id: String,
    generation: u64,
    debounce: Duration,
    snapshot_chars: usize,
}

impl RefreshTask {
    async fn run(self) {
        tokio::time::sleep(self.debounce).await;

        // Past this point the task is no longer cancellable by a newer write;
        // that write schedules its own refresh.
        if let Ok(mut pending) = self.pending.lock() {
            if pending
                .get(&self.profile_id)
                .is_some_and(|entry| entry.generation == self.generation)
            {
                pending.remove(&self.profile_id);
            }
        }

        let RefreshTask {
            db,
            provider,
            profile_id,
            snapshot_chars,
            ..
        } = self;

        let result = tokio::task::spawn_blocking(move || -> anyhow::Result<Option<RefreshOutcome>> {
            let stale = {
                let conn = lock_db(&db)?;
                store::needs_refresh(&conn, &profile_id)?
            };
            if !stale {
                tracing::debug!(profile_id = %profile_id, "embedding already current");
                return Ok(None);
            }
            refresh_profile(&db, provider.as_ref(), &profile_id, snapshot_chars).map(Some)
        })
        .await;

        match result {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "scheduled refresh failed"),
            Err(e) => tracing::warn!(error = %e, "scheduled refresh task failed"),
        }
    }
}
