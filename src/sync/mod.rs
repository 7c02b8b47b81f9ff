//! Embedding sync: keep one embedding record per profile current.
//!
//! [`refresh_profile`] is the single build → embed → persist step. It is
//! driven by the [`scheduler::RefreshScheduler`] after profile writes, by
//! [`backfill::run_backfill`] for profiles that never got one, and lazily by
//! the ranking path.

pub mod backfill;
pub mod scheduler;
pub mod store;

use anyhow::Result;
use rusqlite::Connection;
use std::sync::Mutex;

use crate::db::migrations::get_embedding_dimensions;
use crate::db::now_timestamp;
use crate::embedding::{try_embed, EmbeddingProvider, EmbeddingVector};
use crate::profile::document::{build_document, snapshot};

pub use backfill::{run_backfill, BackfillReport};
pub use scheduler::RefreshScheduler;
pub use store::CoverageReport;

/// Result of a single refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new record was written.
    Updated,
    /// The profile does not exist (deleted in the meantime).
    NotFound,
    /// The embedding call failed; the profile stays stale and will be
    /// picked up again by the next write or backfill.
    EmbeddingUnavailable,
}

pub(crate) fn lock_db(db: &Mutex<Connection>) -> Result<std::sync::MutexGuard<'_, Connection>> {
    db.lock()
        .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))
}

/// Build the profile's document, embed it and persist the record.
///
/// Blocking. The database lock is released while the provider runs so
/// other readers are not held up by a slow embedding call.
pub fn refresh_profile(
    db: &Mutex<Connection>,
    provider: &dyn EmbeddingProvider,
    profile_id: &str,
    snapshot_chars: usize,
) -> Result<RefreshOutcome> {
    // Captured before the read: a concurrent edit must still look newer.
    let read_at = now_timestamp();
    let document = {
        let conn = lock_db(db)?;
        build_document(&conn, profile_id)?
    };
    let Some(document) = document else {
        tracing::debug!(profile_id, "profile not found, nothing to embed");
        return Ok(RefreshOutcome::NotFound);
    };

    let Some(values) = try_embed(provider, &document) else {
        return Ok(RefreshOutcome::EmbeddingUnavailable);
    };

    let mut conn = lock_db(db)?;
    if crate::profile::load::profile_updated_at(&conn, profile_id)?.is_none() {
        return Ok(RefreshOutcome::NotFound);
    }
    let expected = get_embedding_dimensions(&conn)?.unwrap_or_else(|| provider.dimensions());
    let vector = EmbeddingVector::new(values, expected)?;
    store::upsert_embedding(
        &mut conn,
        profile_id,
        &vector,
        &snapshot(&document, snapshot_chars),
        provider.model(),
        &read_at,
    )?;

    tracing::info!(profile_id, dims = vector.dimensions(), "profile embedding updated");
    Ok(RefreshOutcome::Updated)
}
