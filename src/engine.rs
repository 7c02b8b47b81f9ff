//! In-process entry point tying storage, providers and ranking together.
//!
//! [`TalentEngine`] owns the shared state (`Arc<Mutex<Connection>>` plus the
//! two external-service providers) and runs every blocking step through
//! `spawn_blocking`. Candidate scoring fans out over a `JoinSet` bounded by
//! a semaphore; one candidate failing never affects another.

use chrono::Utc;
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::TalentConfig;
use crate::db;
use crate::embedding::{self, try_embed, EmbeddingProvider};
use crate::error::{EngineError, EngineResult};
use crate::extraction::{self, SkillExtractor};
use crate::profile::load::fetch_profiles;
use crate::profile::store::{delete_profile, upsert_profile};
use crate::profile::types::ProfileData;
use crate::ranking::candidates::{rank_candidate, sort_ranked, RankingContext};
use crate::ranking::opportunities::{rank_opportunities as rank_for_employee, Opportunity, RankedOpportunity};
use crate::ranking::weights::validate_builtin_profiles;
use crate::ranking::{RankedCandidate, ScoreBreakdown, Similarity, SimilarityMode, WeightProfile};
use crate::search::{hydrate_matches, search_profiles, SearchHit, SearchOptions};
use crate::sync::backfill::{run_backfill, BackfillOptions, BackfillReport};
use crate::sync::store::{embedding_coverage, needs_refresh, CoverageReport};
use crate::sync::{lock_db, refresh_profile, RefreshOutcome, RefreshScheduler};

/// Unwrap an [`EngineError`] carried inside an `anyhow` chain, or classify
/// the error as a storage failure.
fn into_engine(err: anyhow::Error) -> EngineError {
    match err.downcast::<EngineError>() {
        Ok(engine) => engine,
        Err(other) => EngineError::Storage(other),
    }
}

pub struct TalentEngine {
    db: Arc<Mutex<Connection>>,
    provider: Arc<dyn EmbeddingProvider>,
    extractor: Arc<dyn SkillExtractor>,
    config: Arc<TalentConfig>,
    scheduler: RefreshScheduler,
}

impl TalentEngine {
    /// Validate the configuration, build both providers from it and open the
    /// configured database.
    pub fn open(config: TalentConfig) -> EngineResult<Self> {
        config.validate()?;
        let provider: Arc<dyn EmbeddingProvider> = Arc::from(
            embedding::create_provider(&config.embedding)
                .map_err(|e| EngineError::Config(format!("{e:#}")))?,
        );
        let extractor: Arc<dyn SkillExtractor> = Arc::from(
            extraction::create_extractor(&config.extraction)
                .map_err(|e| EngineError::Config(format!("{e:#}")))?,
        );
        let conn = db::open_database(config.resolved_db_path(), config.embedding.dimensions)
            .map_err(into_engine)?;
        Self::with_components(conn, provider, extractor, config)
    }

    /// Assemble an engine from already-built parts (tests, embedding hosts).
    pub fn with_components(
        conn: Connection,
        provider: Arc<dyn EmbeddingProvider>,
        extractor: Arc<dyn SkillExtractor>,
        config: TalentConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        validate_builtin_profiles()?;

        let stored_dims = db::migrations::get_embedding_dimensions(&conn)
            .map_err(|e| EngineError::Storage(e.into()))?;
        if let Some(expected) = stored_dims {
            if provider.dimensions() != expected {
                return Err(EngineError::DimensionMismatch {
                    expected,
                    actual: provider.dimensions(),
                });
            }
        }
        check_model(&conn, provider.model()).map_err(into_engine)?;

        let db = Arc::new(Mutex::new(conn));
        let scheduler = RefreshScheduler::new(
            Arc::clone(&db),
            Arc::clone(&provider),
            Duration::from_secs(config.sync.debounce_secs),
            config.sync.snapshot_chars,
        );

        tracing::info!(
            model = provider.model(),
            dims = provider.dimensions(),
            similarity = %config.ranking.similarity,
            "talent engine ready"
        );

        Ok(Self {
            db,
            provider,
            extractor,
            config: Arc::new(config),
            scheduler,
        })
    }

    pub fn config(&self) -> &TalentConfig {
        &self.config
    }

    pub fn db(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.db)
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    /// Write a profile and schedule its re-embedding. Returns the new
    /// `updated_at`. The embedding call happens later, off this path.
    pub async fn save_profile(&self, data: ProfileData) -> EngineResult<String> {
        let db = Arc::clone(&self.db);
        let id = data.id().to_string();
        let updated_at = tokio::task::spawn_blocking(move || {
            let mut conn = lock_db(&db)?;
            upsert_profile(&mut conn, &data)
        })
        .await?
        .map_err(into_engine)?;

        self.scheduler.schedule(&id);
        Ok(updated_at)
    }

    pub async fn remove_profile(&self, profile_id: &str) -> EngineResult<bool> {
        let db = Arc::clone(&self.db);
        let id = profile_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = lock_db(&db)?;
            delete_profile(&conn, &id)
        })
        .await?
        .map_err(into_engine)
    }

    /// Rebuild one profile's embedding now, regardless of staleness.
    pub async fn refresh(&self, profile_id: &str) -> EngineResult<RefreshOutcome> {
        let db = Arc::clone(&self.db);
        let provider = Arc::clone(&self.provider);
        let id = profile_id.to_string();
        let chars = self.config.sync.snapshot_chars;
        tokio::task::spawn_blocking(move || refresh_profile(&db, provider.as_ref(), &id, chars))
            .await?
            .map_err(into_engine)
    }

    /// Embed every eligible profile that has no embedding yet.
    pub async fn backfill(&self) -> EngineResult<BackfillReport> {
        self.backfill_with_progress(|_, _| {}).await
    }

    pub async fn backfill_with_progress(
        &self,
        on_item: impl FnMut(&str, bool),
    ) -> EngineResult<BackfillReport> {
        let options = BackfillOptions {
            batch_size: self.config.sync.backfill_batch_size,
            delay: Duration::from_millis(self.config.sync.backfill_delay_ms),
            snapshot_chars: self.config.sync.snapshot_chars,
        };
        run_backfill(
            Arc::clone(&self.db),
            Arc::clone(&self.provider),
            options,
            on_item,
        )
        .await
        .map_err(into_engine)
    }

    pub async fn coverage(&self) -> EngineResult<CoverageReport> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = lock_db(&db)?;
            embedding_coverage(&conn)
        })
        .await?
        .map_err(into_engine)
    }

    /// Semantic search over stored profile embeddings.
    ///
    /// An unavailable embedding service yields an empty result, not an error.
    pub async fn search(
        &self,
        query: &str,
        options: Option<SearchOptions>,
    ) -> EngineResult<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(EngineError::EmptyQuery);
        }
        let options = options.unwrap_or(SearchOptions {
            threshold: self.config.search.default_threshold,
            limit: self.config.search.default_limit,
        });

        let provider = Arc::clone(&self.provider);
        let text = query.to_string();
        let Some(query_embedding) =
            tokio::task::spawn_blocking(move || try_embed(provider.as_ref(), &text)).await?
        else {
            tracing::warn!("query embedding unavailable, returning no results");
            return Ok(Vec::new());
        };

        let db = Arc::clone(&self.db);
        let hits = tokio::task::spawn_blocking(move || {
            let conn = lock_db(&db)?;
            let matches = search_profiles(&conn, &query_embedding, &options)?;
            hydrate_matches(&conn, matches)
        })
        .await?
        .map_err(into_engine)?;

        tracing::info!(hits = hits.len(), "profile search");
        Ok(hits)
    }

    /// Rank `candidate_ids` for a free-text request.
    ///
    /// Unknown ids are skipped. The result is sorted by composite score,
    /// ties keeping the input order.
    pub async fn rank_candidates(
        &self,
        query: &str,
        candidate_ids: &[String],
        weight_profile: WeightProfile,
    ) -> EngineResult<Vec<RankedCandidate>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(EngineError::EmptyQuery);
        }
        if candidate_ids.is_empty() {
            return Ok(Vec::new());
        }

        let required_skills = self.extract_required_skills(query).await?;
        let candidates = self.load_candidates(candidate_ids).await?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let weights = weight_profile.weights();
        let ctx = Arc::new(RankingContext {
            query: query.to_string(),
            required_skills,
            similarity: self.similarity(),
            weights,
            today: Utc::now().date_naive(),
        });

        let semaphore = Arc::new(Semaphore::new(self.config.ranking.max_concurrency));
        let mut set = JoinSet::new();
        let total = candidates.len();

        for (idx, candidate) in candidates.into_iter().enumerate() {
            let ctx = Arc::clone(&ctx);
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let profile_id = candidate.id().to_string();
                let scored =
                    tokio::task::spawn_blocking(move || rank_candidate(&ctx, &candidate)).await;
                match scored {
                    Ok(ranked) => (idx, ranked),
                    Err(e) => {
                        tracing::warn!(profile_id = %profile_id, error = %e, "candidate scoring failed");
                        let breakdown = ScoreBreakdown::fallback();
                        (
                            idx,
                            RankedCandidate {
                                profile_id,
                                composite_score: breakdown.composite(&weights),
                                breakdown,
                            },
                        )
                    }
                }
            });
        }

        let mut slots: Vec<Option<RankedCandidate>> = vec![None; total];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, ranked)) => slots[idx] = Some(ranked),
                Err(e) => tracing::warn!(error = %e, "candidate task aborted"),
            }
        }

        let mut ranked: Vec<RankedCandidate> = slots.into_iter().flatten().collect();
        sort_ranked(&mut ranked);

        tracing::info!(
            candidates = ranked.len(),
            profile = %weight_profile,
            "candidates ranked"
        );
        Ok(ranked)
    }

    /// Rank opportunities for one employee.
    pub async fn rank_opportunities(
        &self,
        profile_id: &str,
        opportunities: &[Opportunity],
    ) -> EngineResult<Vec<RankedOpportunity>> {
        let db = Arc::clone(&self.db);
        let id = profile_id.to_string();
        let employee = tokio::task::spawn_blocking(move || {
            let conn = lock_db(&db)?;
            crate::profile::load::fetch_profile(&conn, &id)
        })
        .await?
        .map_err(into_engine)?
        .ok_or_else(|| EngineError::ProfileNotFound(profile_id.to_string()))?;

        let similarity = self.similarity();
        let opportunities = opportunities.to_vec();
        let ranked = tokio::task::spawn_blocking(move || {
            rank_for_employee(&employee, &opportunities, &similarity)
        })
        .await?;

        tracing::info!(profile_id, count = ranked.len(), "opportunities ranked");
        Ok(ranked)
    }

    fn similarity(&self) -> Similarity {
        let mode = self
            .config
            .ranking
            .similarity
            .parse::<SimilarityMode>()
            .unwrap_or(SimilarityMode::Lexical);
        Similarity::new(mode, Arc::clone(&self.provider))
    }

    /// `None` when extraction failed; the request proceeds with defaults.
    async fn extract_required_skills(&self, query: &str) -> EngineResult<Option<Vec<String>>> {
        let extractor = Arc::clone(&self.extractor);
        let text = query.to_string();
        let extracted = tokio::task::spawn_blocking(move || extractor.extract_skills(&text)).await?;
        Ok(match extracted {
            Ok(skills) => {
                tracing::debug!(skills = ?skills, "required skills");
                Some(skills)
            }
            Err(e) => {
                tracing::warn!(error = %e, "skill extraction failed");
                None
            }
        })
    }

    /// Hydrate candidates in input order, dropping unknown ids and
    /// scheduling a refresh for stale embeddings when configured.
    async fn load_candidates(&self, candidate_ids: &[String]) -> EngineResult<Vec<ProfileData>> {
        let db = Arc::clone(&self.db);
        let ids = candidate_ids.to_vec();
        let refresh_on_rank = self.config.sync.refresh_on_rank;

        let (candidates, stale) = tokio::task::spawn_blocking(move || {
            let conn = lock_db(&db)?;
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let mut found: HashMap<String, ProfileData> = fetch_profiles(&conn, &refs)?;

            let mut ordered = Vec::with_capacity(found.len());
            let mut stale = Vec::new();
            for id in &ids {
                let Some(data) = found.remove(id) else {
                    tracing::debug!(profile_id = %id, "unknown candidate skipped");
                    continue;
                };
                if refresh_on_rank && needs_refresh(&conn, id)? {
                    stale.push(id.clone());
                }
                ordered.push(data);
            }
            anyhow::Ok((ordered, stale))
        })
        .await?
        .map_err(into_engine)?;

        for id in &stale {
            self.scheduler.schedule(id);
        }
        Ok(candidates)
    }
}

/// Record the active model, warning when it differs from the one that
/// produced the stored vectors.
fn check_model(conn: &Connection, model: &str) -> anyhow::Result<()> {
    let stored = db::migrations::get_embedding_model(conn)?;
    match stored.as_deref() {
        Some(previous) if previous != model => {
            tracing::warn!(
                previous,
                current = model,
                "embedding model changed; stored vectors may not be comparable until re-embedded"
            );
            db::migrations::set_embedding_model(conn, model)?;
        }
        Some(_) => {}
        None => db::migrations::set_embedding_model(conn, model)?,
    }
    Ok(())
}
