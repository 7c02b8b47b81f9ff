//! Embedding record persistence, staleness checks and coverage statistics.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::db::parse_timestamp;
use crate::embedding::EmbeddingVector;

/// Bookkeeping row for a stored embedding (the vector itself lives in
/// `profile_vec`).
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingMeta {
    pub profile_id: String,
    pub snapshot: String,
    pub model: String,
    pub dimensions: usize,
    pub updated_at: String,
}

/// Embedding coverage over eligible (`employee`) profiles.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoverageReport {
    pub total_profiles: usize,
    pub with_embedding: usize,
    /// 0 to 100, one decimal place.
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Write (or overwrite) the embedding record of a profile.
///
/// `updated_at` is supplied by the caller: it must be the instant the
/// document was read, so an edit that lands during the embedding call still
/// leaves the record stale.
pub fn upsert_embedding(
    conn: &mut Connection,
    profile_id: &str,
    vector: &EmbeddingVector,
    snapshot: &str,
    model: &str,
    updated_at: &str,
) -> Result<()> {
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO profile_embeddings (profile_id, snapshot, model, dimensions, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(profile_id) DO UPDATE SET
             snapshot = excluded.snapshot,
             model = excluded.model,
             dimensions = excluded.dimensions,
             updated_at = excluded.updated_at",
        params![profile_id, snapshot, model, vector.dimensions() as i64, updated_at],
    )
    .with_context(|| format!("failed to write embedding record for {profile_id}"))?;

    // vec0 has no upsert
    tx.execute(
        "DELETE FROM profile_vec WHERE profile_id = ?1",
        params![profile_id],
    )?;
    tx.execute(
        "INSERT INTO profile_vec (profile_id, embedding) VALUES (?1, ?2)",
        params![profile_id, vector.to_bytes()],
    )?;

    tx.commit()?;
    Ok(())
}

pub fn get_embedding_meta(conn: &Connection, profile_id: &str) -> Result<Option<EmbeddingMeta>> {
    conn.query_row(
        "SELECT profile_id, snapshot, model, dimensions, updated_at
         FROM profile_embeddings WHERE profile_id = ?1",
        params![profile_id],
        |row| {
            Ok(EmbeddingMeta {
                profile_id: row.get(0)?,
                snapshot: row.get(1)?,
                model: row.get(2)?,
                dimensions: row.get::<_, i64>(3)? as usize,
                updated_at: row.get(4)?,
            })
        },
    )
    .optional()
    .context("failed to read embedding record")
}

/// `true` when the profile exists and either has no embedding record or was
/// modified after its record was written. Unknown profiles are never stale.
pub fn needs_refresh(conn: &Connection, profile_id: &str) -> Result<bool> {
    let row: Option<(String, Option<String>)> = conn
        .query_row(
            "SELECT p.updated_at, e.updated_at
             FROM profiles p
             LEFT JOIN profile_embeddings e ON e.profile_id = p.id
             WHERE p.id = ?1",
            params![profile_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        None => Ok(false),
        Some((_, None)) => Ok(true),
        Some((profile_updated, Some(embedding_updated))) => {
            Ok(parse_timestamp(&profile_updated)? > parse_timestamp(&embedding_updated)?)
        }
    }
}

pub fn embedding_coverage(conn: &Connection) -> Result<CoverageReport> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM profiles WHERE role = 'employee'",
        [],
        |row| row.get(0),
    )?;
    let (with_embedding, last_updated): (i64, Option<String>) = conn.query_row(
        "SELECT COUNT(*), MAX(e.updated_at)
         FROM profile_embeddings e
         JOIN profiles p ON p.id = e.profile_id
         WHERE p.role = 'employee'",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let percentage = if total > 0 {
        (with_embedding as f64 / total as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    Ok(CoverageReport {
        total_profiles: total as usize,
        with_embedding: with_embedding as usize,
        percentage,
        last_updated,
    })
}

/// Employee profiles without an embedding record, most recently updated first.
pub fn profiles_missing_embeddings(conn: &Connection, limit: usize) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT p.id FROM profiles p
         LEFT JOIN profile_embeddings e ON e.profile_id = p.id
         WHERE p.role = 'employee' AND e.profile_id IS NULL
         ORDER BY p.updated_at DESC, p.id
         LIMIT ?1",
    )?;
    let ids = stmt
        .query_map(params![limit as i64], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::now_timestamp;
    use crate::profile::store::{delete_profile, touch_profile, upsert_profile};
    use crate::profile::types::{Profile, ProfileData};

    const DIM: usize = 4;

    fn employee(id: &str, role: &str) -> ProfileData {
        ProfileData {
            profile: Profile {
                id: id.into(),
                display_name: format!("Person {id}"),
                role: role.into(),
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
        }
    }

    fn unit() -> EmbeddingVector {
        EmbeddingVector::new(vec![1.0, 0.0, 0.0, 0.0], DIM).unwrap()
    }

    #[test]
    fn missing_record_is_stale_and_fresh_record_is_not() {
        let mut conn = crate::db::open_memory_database(DIM).unwrap();
        upsert_profile(&mut conn, &employee("p1", "employee")).unwrap();
        assert!(needs_refresh(&conn, "p1").unwrap());

        upsert_embedding(&mut conn, "p1", &unit(), "Person p1", "test", &now_timestamp()).unwrap();
        assert!(!needs_refresh(&conn, "p1").unwrap());

        std::thread::sleep(std::time::Duration::from_millis(5));
        touch_profile(&conn, "p1").unwrap();
        assert!(needs_refresh(&conn, "p1").unwrap());

        assert!(!needs_refresh(&conn, "ghost").unwrap());
    }

    #[test]
    fn upsert_overwrites_single_vector_row() {
        let mut conn = crate::db::open_memory_database(DIM).unwrap();
        upsert_profile(&mut conn, &employee("p1", "employee")).unwrap();
        upsert_embedding(&mut conn, "p1", &unit(), "first", "m1", &now_timestamp()).unwrap();
        let other = EmbeddingVector::new(vec![0.0, 1.0, 0.0, 0.0], DIM).unwrap();
        upsert_embedding(&mut conn, "p1", &other, "second", "m2", &now_timestamp()).unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM profile_vec", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
        let meta = get_embedding_meta(&conn, "p1").unwrap().unwrap();
        assert_eq!(meta.snapshot, "second");
        assert_eq!(meta.model, "m2");
        assert_eq!(meta.dimensions, DIM);
    }

    #[test]
    fn deleting_profile_removes_embedding_rows() {
        let mut conn = crate::db::open_memory_database(DIM).unwrap();
        upsert_profile(&mut conn, &employee("p1", "employee")).unwrap();
        upsert_embedding(&mut conn, "p1", &unit(), "doc", "m", &now_timestamp()).unwrap();

        delete_profile(&conn, "p1").unwrap();
        assert!(get_embedding_meta(&conn, "p1").unwrap().is_none());
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM profile_vec", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn coverage_counts_only_employees() {
        let mut conn = crate::db::open_memory_database(DIM).unwrap();
        upsert_profile(&mut conn, &employee("p1", "employee")).unwrap();
        upsert_profile(&mut conn, &employee("p2", "employee")).unwrap();
        upsert_profile(&mut conn, &employee("p3", "employee")).unwrap();
        upsert_profile(&mut conn, &employee("hr", "hr_manager")).unwrap();
        upsert_embedding(&mut conn, "p1", &unit(), "doc", "m", &now_timestamp()).unwrap();

        let report = embedding_coverage(&conn).unwrap();
        assert_eq!(report.total_profiles, 3);
        assert_eq!(report.with_embedding, 1);
        assert!((report.percentage - 33.3).abs() < 1e-9);
        assert!(report.last_updated.is_some());

        let missing = profiles_missing_embeddings(&conn, 10).unwrap();
        assert_eq!(missing.len(), 2);
        assert!(!missing.contains(&"hr".to_string()));
        assert_eq!(profiles_missing_embeddings(&conn, 1).unwrap().len(), 1);
    }

    #[test]
    fn empty_store_coverage() {
        let conn = crate::db::open_memory_database(DIM).unwrap();
        let report = embedding_coverage(&conn).unwrap();
        assert_eq!(report.total_profiles, 0);
        assert_eq!(report.percentage, 0.0);
        assert!(report.last_updated.is_none());
    }
}
