//! SQL DDL for all talentmatch tables.
//!
//! The `profiles`, `profile_skills`, `profile_projects` and `career_goals`
//! tables mirror the records owned by the profile collaborators. The
//! `profile_embeddings` table and the `profile_vec` (vec0) virtual table hold
//! the embedding records this crate maintains. All DDL uses `IF NOT EXISTS`
//! for idempotent initialization.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'employee',
    job_title TEXT,
    department TEXT,
    level INTEGER,
    profile_strength INTEGER NOT NULL DEFAULT 0
        CHECK(profile_strength >= 0 AND profile_strength <= 100),
    lifetime_earned INTEGER NOT NULL DEFAULT 0,
    enrolled_courses INTEGER NOT NULL DEFAULT 0,
    mentoring_sessions INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_profiles_role_updated ON profiles(role, updated_at);

CREATE TABLE IF NOT EXISTS profile_skills (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    level INTEGER NOT NULL CHECK(level >= 1 AND level <= 5),
    verified INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL CHECK(status IN ('using','want_to_learn'))
);

CREATE INDEX IF NOT EXISTS idx_skills_profile ON profile_skills(profile_id);

CREATE TABLE IF NOT EXISTS profile_projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    role TEXT NOT NULL,
    achievements TEXT,
    start_date TEXT NOT NULL,
    end_date TEXT
);

CREATE INDEX IF NOT EXISTS idx_projects_profile ON profile_projects(profile_id);

CREATE TABLE IF NOT EXISTS career_goals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    profile_id TEXT NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
    goal_type TEXT NOT NULL,
    target TEXT NOT NULL,
    priority INTEGER NOT NULL CHECK(priority >= 1 AND priority <= 5)
);

CREATE INDEX IF NOT EXISTS idx_goals_profile ON career_goals(profile_id);

-- Embedding bookkeeping (vector lives in profile_vec)
CREATE TABLE IF NOT EXISTS profile_embeddings (
    profile_id TEXT PRIMARY KEY REFERENCES profiles(id) ON DELETE CASCADE,
    snapshot TEXT NOT NULL,
    model TEXT NOT NULL,
    dimensions INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Keeps the vec0 table in step with the FK cascade on `profile_embeddings`.
const VEC_CLEANUP_TRIGGER_SQL: &str = r#"
CREATE TRIGGER IF NOT EXISTS trg_profile_embeddings_delete
AFTER DELETE ON profile_embeddings
BEGIN
    DELETE FROM profile_vec WHERE profile_id = OLD.profile_id;
END;
"#;

/// vec0 DDL for the given dimension (sqlite-vec syntax).
fn vec_table_sql(dimensions: usize) -> String {
    format!(
        "CREATE VIRTUAL TABLE IF NOT EXISTS profile_vec USING vec0(\n    \
         profile_id TEXT PRIMARY KEY,\n    \
         embedding FLOAT[{dimensions}]\n);"
    )
}

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
///
/// The first call fixes the embedding dimension for this database; later
/// calls leave the stored value alone so [`super::migrations::check_dimensions`]
/// can detect a mismatch.
pub fn init_schema(conn: &Connection, dimensions: usize) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(&vec_table_sql(dimensions))?;
    conn.execute_batch(VEC_CLEANUP_TRIGGER_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('embedding_dimensions', ?1)",
        [dimensions.to_string()],
    )?;

    Ok(())
}
