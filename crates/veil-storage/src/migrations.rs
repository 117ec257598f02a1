//! Database migrations
//!
//! Schema: sessions (one row per visited domain), modes (one row per domain
//! with a saved content policy)

use crate::Result;
use rusqlite::Connection;

const SCHEMA_VERSION: i32 = 1;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}

fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<i32, _> =
        conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        });

    match result {
        Ok(v) => Ok(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(rusqlite::Error::SqliteFailure(_, _)) => {
            // Table doesn't exist yet
            conn.execute(
                "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
                [],
            )?;
            conn.execute("INSERT INTO schema_version (version) VALUES (0)", [])?;
            Ok(0)
        }
        Err(e) => Err(e.into()),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v1: Initial schema");

    // seq keeps registration order across restarts
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            domain TEXT NOT NULL UNIQUE,
            agent TEXT,
            tabs TEXT NOT NULL DEFAULT '[]',
            warning INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
    "#,
    )?;

    // Whole-matrix rows; a missing row means no policy on file
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS modes (
            domain TEXT PRIMARY KEY,
            text INTEGER NOT NULL,
            image INTEGER NOT NULL,
            audio INTEGER NOT NULL,
            video INTEGER NOT NULL,
            other INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
    "#,
    )?;

    Ok(())
}
