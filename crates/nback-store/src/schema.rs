use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rounds (
            id                     TEXT PRIMARY KEY,
            played_at              TEXT NOT NULL,
            level                  INTEGER NOT NULL,
            next_level             INTEGER NOT NULL,
            trials                 INTEGER NOT NULL,
            total_errors           INTEGER NOT NULL,
            position_hits          INTEGER NOT NULL,
            position_misses        INTEGER NOT NULL,
            position_false_alarms  INTEGER NOT NULL,
            position_targets       INTEGER NOT NULL,
            position_d_prime       REAL NOT NULL,
            symbol_hits            INTEGER NOT NULL,
            symbol_misses          INTEGER NOT NULL,
            symbol_false_alarms    INTEGER NOT NULL,
            symbol_targets         INTEGER NOT NULL,
            symbol_d_prime         REAL NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_rounds_next_level ON rounds(next_level);
        ",
    )?;

    let version: Option<String> = match conn.query_row(
        "SELECT value FROM metadata WHERE key = 'schema_version'",
        [],
        |row| row.get(0),
    ) {
        Ok(v) => Some(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => None,
        Err(e) => return Err(e.into()),
    };

    match version.and_then(|v| v.parse::<i64>().ok()) {
        Some(v) if v > SCHEMA_VERSION => {
            tracing::warn!(
                "database schema v{v} is newer than this build (v{SCHEMA_VERSION})"
            );
        }
        Some(_) => {}
        None => {
            conn.execute(
                "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
                [SCHEMA_VERSION.to_string()],
            )?;
            tracing::debug!("initialized round store schema v{SCHEMA_VERSION}");
        }
    }

    Ok(())
}
