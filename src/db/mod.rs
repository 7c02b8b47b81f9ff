pub mod migrations;
pub mod schema;

use anyhow::{Context, Result};
use rusqlite::Connection;
use sqlite_vec::sqlite3_vec_init;
use std::path::Path;
use std::sync::Once;

static SQLITE_VEC_INIT: Once = Once::new();

/// Register the sqlite-vec extension globally. Safe to call multiple times.
pub fn load_sqlite_vec() {
    SQLITE_VEC_INIT.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

/// Open (or create) the database at the given path, with all extensions
/// loaded, schema initialized and the vector dimension verified.
///
/// A dimension mismatch is returned as an [`crate::error::EngineError`]
/// wrapped in `anyhow`; callers that care can downcast.
pub fn open_database(path: impl AsRef<Path>, dimensions: usize) -> Result<Connection> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    load_sqlite_vec();

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(std::time::Duration::from_millis(5000))?;

    prepare(&conn, dimensions)?;

    tracing::info!(path = %path.display(), dimensions, "database initialized");
    Ok(conn)
}

/// Open an in-memory database with schema and migrations applied.
pub fn open_memory_database(dimensions: usize) -> Result<Connection> {
    load_sqlite_vec();
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    prepare(&conn, dimensions)?;
    Ok(conn)
}

/// Current UTC time in the fixed-width RFC 3339 form stored in `updated_at`
/// columns.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Parse a stored `updated_at` value.
pub fn parse_timestamp(value: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .with_context(|| format!("invalid timestamp: {value}"))
}

fn prepare(conn: &Connection, dimensions: usize) -> Result<()> {
    schema::init_schema(conn, dimensions).context("failed to initialize schema")?;
    migrations::run_migrations(conn).context("failed to run migrations")?;
    migrations::check_dimensions(conn, dimensions)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn reopening_with_other_dimension_is_fatal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("talent.db");
        drop(open_database(&path, 8).unwrap());

        let err = open_database(&path, 16).unwrap_err();
        let engine_err = err.downcast_ref::<EngineError>().expect("engine error");
        assert!(engine_err.is_fatal());
        assert!(matches!(
            engine_err,
            EngineError::DimensionMismatch { expected: 16, actual: 8 }
        ));
    }

    #[test]
    fn timestamps_parse_back() {
        let now = now_timestamp();
        assert!(now.ends_with('Z'));
        assert!(parse_timestamp(&now).is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn busy_timeout_is_set() {
        let tmp = tempfile::TempDir::new().unwrap();
        let conn = open_database(tmp.path().join("t.db"), 8).unwrap();
        let timeout: i64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 5000);
    }
}
