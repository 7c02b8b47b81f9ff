//! One-shot backfill of profiles that have never been embedded.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{lock_db, refresh_profile, store, RefreshOutcome};
use crate::embedding::EmbeddingProvider;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct BackfillOptions {
    pub batch_size: usize,
    /// Pause between items so the embedding service is not flooded.
    pub delay: Duration,
    pub snapshot_chars: usize,
}

/// Embed up to `batch_size` employee profiles without a record.
///
/// Items are processed sequentially. A failing item is counted and skipped;
/// it never aborts the run. Re-running after a complete pass finds nothing
/// to do. `on_item` is called after each item (for progress reporting).
pub async fn run_backfill(
    db: Arc<Mutex<Connection>>,
    provider: Arc<dyn EmbeddingProvider>,
    options: BackfillOptions,
    mut on_item: impl FnMut(&str, bool),
) -> Result<BackfillReport> {
    let ids = {
        let db = Arc::clone(&db);
        let limit = options.batch_size;
        tokio::task::spawn_blocking(move || {
            let conn = lock_db(&db)?;
            store::profiles_missing_embeddings(&conn, limit)
        })
        .await??
    };

    let mut report = BackfillReport {
        total: ids.len(),
        ..Default::default()
    };
    if ids.is_empty() {
        tracing::info!("backfill: every eligible profile already has an embedding");
        return Ok(report);
    }

    tracing::info!(total = ids.len(), "backfill started");

    for (i, id) in ids.iter().enumerate() {
        if i > 0 && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }

        let outcome = {
            let db = Arc::clone(&db);
            let provider = Arc::clone(&provider);
            let id = id.clone();
            let chars = options.snapshot_chars;
            tokio::task::spawn_blocking(move || {
                refresh_profile(&db, provider.as_ref(), &id, chars)
            })
            .await
        };

        let ok = match outcome {
            Ok(Ok(RefreshOutcome::Updated)) => true,
            Ok(Ok(other)) => {
                tracing::warn!(profile_id = %id, outcome = ?other, "backfill item skipped");
                false
            }
            Ok(Err(e)) => {
                tracing::warn!(profile_id = %id, error = %e, "backfill item failed");
                false
            }
            Err(e) => {
                tracing::warn!(profile_id = %id, error = %e, "backfill task failed");
                false
            }
        };

        if ok {
            report.succeeded += 1;
        } else {
            report.failed += 1;
        }
        on_item(id, ok);
    }

    tracing::info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed,
        "backfill finished"
    );
    Ok(report)
}
