//! Nearest-neighbour retrieval over stored profile embeddings.

use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db::migrations::get_embedding_dimensions;
use crate::embedding::vector_to_bytes;
use crate::error::EngineError;
use crate::profile::load::fetch_profiles;
use crate::profile::types::ProfileData;

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Results must score strictly above this.
    pub threshold: f64,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            limit: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileMatch {
    pub profile_id: String,
    pub similarity: f64,
}

/// A match with its profile attached.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub profile_id: String,
    pub similarity: f64,
    pub profile: ProfileData,
}

/// Largest `k` sqlite-vec accepts for a KNN query.
pub const MAX_KNN_LIMIT: usize = 4096;

/// Convert sqlite-vec's L2 distance between unit vectors to cosine
/// similarity, clamped to [0, 1].
fn distance_to_similarity(distance: f64) -> f64 {
    (1.0 - distance * distance / 2.0).clamp(0.0, 1.0)
}

/// Profiles whose embedding is most similar to `query_embedding`,
/// best first.
///
/// The query vector must be L2-normalized and match the store's dimension.
/// A zero vector has no direction and matches nothing. `limit` is capped at
/// [`MAX_KNN_LIMIT`].
pub fn search_profiles(
    conn: &Connection,
    query_embedding: &[f32],
    options: &SearchOptions,
) -> Result<Vec<ProfileMatch>> {
    if options.limit == 0 {
        return Ok(Vec::new());
    }
    if let Some(expected) = get_embedding_dimensions(conn)? {
        if query_embedding.len() != expected {
            return Err(EngineError::DimensionMismatch {
                expected,
                actual: query_embedding.len(),
            }
            .into());
        }
    }
    let norm_sq: f32 = query_embedding.iter().map(|x| x * x).sum();
    if norm_sq <= f32::EPSILON {
        tracing::debug!("zero query vector, no matches");
        return Ok(Vec::new());
    }

    let limit = options.limit.min(MAX_KNN_LIMIT);
    let bytes = vector_to_bytes(query_embedding);
    let mut stmt = conn.prepare(
        "SELECT profile_id, distance FROM profile_vec \
         WHERE embedding MATCH ?1 ORDER BY distance LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(params![bytes, limit as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let matches: Vec<ProfileMatch> = rows
        .into_iter()
        .map(|(profile_id, distance)| ProfileMatch {
            profile_id,
            similarity: distance_to_similarity(distance),
        })
        .filter(|m| m.similarity > options.threshold)
        .collect();

    tracing::debug!(
        hits = matches.len(),
        threshold = options.threshold,
        limit,
        "vector search"
    );
    Ok(matches)
}

/// Attach profile data to matches, keeping rank order. Matches whose
/// profile no longer exists are dropped.
pub fn hydrate_matches(conn: &Connection, matches: Vec<ProfileMatch>) -> Result<Vec<SearchHit>> {
    let ids: Vec<&str> = matches.iter().map(|m| m.profile_id.as_str()).collect();
    let mut profiles = fetch_profiles(conn, &ids)?;

    Ok(matches
        .into_iter()
        .filter_map(|m| {
            profiles.remove(&m.profile_id).map(|profile| SearchHit {
                profile_id: m.profile_id,
                similarity: m.similarity,
                profile,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::now_timestamp;
    use crate::embedding::{l2_normalize, EmbeddingVector};
    use crate::profile::store::upsert_profile;
    use crate::profile::types::Profile;
    use crate::sync::store::upsert_embedding;

    const DIM: usize = 4;

    fn seed(conn: &mut Connection, id: &str, vector: &[f32]) {
        let data = ProfileData {
            profile: Profile {
                id: id.into(),
                display_name: id.to_uppercase(),
                role: "employee".into(),
                job_title: None,
                department: None,
                level: None,
                profile_strength: 0,
                lifetime_earned: 0,
                enrolled_courses: 0,
                mentoring_sessions: 0,
                updated_at: String::new(),
            },
            skills: Vec::new(),
            projects: Vec::new(),
            goals: Vec::new(),
        };
        upsert_profile(conn, &data).unwrap();
        let v = EmbeddingVector::new(l2_normalize(vector), DIM).unwrap();
        upsert_embedding(conn, id, &v, id, "test", &now_timestamp()).unwrap();
    }

    fn seeded() -> Connection {
        let mut conn = crate::db::open_memory_database(DIM).unwrap();
        seed(&mut conn, "exact", &[1.0, 0.0, 0.0, 0.0]);
        seed(&mut conn, "close", &[0.9, 0.1, 0.0, 0.0]);
        seed(&mut conn, "far", &[0.0, 0.0, 1.0, 0.0]);
        conn
    }

    #[test]
    fn results_are_descending_and_above_threshold() {
        let conn = seeded();
        let opts = SearchOptions {
            threshold: 0.3,
            limit: 10,
        };
        let hits = search_profiles(&conn, &[1.0, 0.0, 0.0, 0.0], &opts).unwrap();
        let ids: Vec<&str> = hits.iter().map(|m| m.profile_id.as_str()).collect();
        assert_eq!(ids, vec!["exact", "close"]);
        assert!((hits[0].similarity - 1.0).abs() < 1e-5);
        assert!(hits[0].similarity > hits[1].similarity);
    }

    #[test]
    fn threshold_above_one_returns_nothing() {
        let conn = seeded();
        let opts = SearchOptions {
            threshold: 1.01,
            limit: 10,
        };
        assert!(search_profiles(&conn, &[1.0, 0.0, 0.0, 0.0], &opts)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn limit_caps_results() {
        let conn = seeded();
        let opts = SearchOptions {
            threshold: 0.0,
            limit: 1,
        };
        let hits = search_profiles(&conn, &[1.0, 0.0, 0.0, 0.0], &opts).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].profile_id, "exact");
    }

    #[test]
    fn zero_query_vector_matches_nothing() {
        let conn = seeded();
        let opts = SearchOptions {
            threshold: 0.3,
            limit: 10,
        };
        assert!(search_profiles(&conn, &[0.0; DIM], &opts).unwrap().is_empty());
    }

    #[test]
    fn oversized_limit_is_capped() {
        let conn = seeded();
        let opts = SearchOptions {
            threshold: 0.0,
            limit: 5000,
        };
        let hits = search_profiles(&conn, &[1.0, 0.0, 0.0, 0.0], &opts).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].profile_id, "exact");
    }

    #[test]
    fn empty_index_returns_empty() {
        let conn = crate::db::open_memory_database(DIM).unwrap();
        let hits = search_profiles(&conn, &[1.0, 0.0, 0.0, 0.0], &SearchOptions::default()).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn wrong_query_dimension_is_rejected() {
        let conn = seeded();
        let err = search_profiles(&conn, &[1.0, 0.0], &SearchOptions::default()).unwrap_err();
        assert!(err.downcast_ref::<EngineError>().is_some());
    }

    #[test]
    fn hydration_keeps_order_and_drops_vanished() {
        let conn = seeded();
        let matches = vec![
            ProfileMatch {
                profile_id: "close".into(),
                similarity: 0.9,
            },
            ProfileMatch {
                profile_id: "gone".into(),
                similarity: 0.8,
            },
            ProfileMatch {
                profile_id: "exact".into(),
                similarity: 0.7,
            },
        ];
        let hits = hydrate_matches(&conn, matches).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.profile_id.as_str()).collect();
        assert_eq!(ids, vec!["close", "exact"]);
        assert_eq!(hits[0].profile.profile.display_name, "CLOSE");
    }

    #[test]
    fn distance_conversion_is_clamped() {
        assert!((distance_to_similarity(0.0) - 1.0).abs() < 1e-12);
        assert_eq!(distance_to_similarity(2.0), 0.0);
        assert_eq!(distance_to_similarity(1.5), 0.0);
    }
}
