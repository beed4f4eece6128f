use std::fs;
use std::path::Path;

use nback_core::difficulty::classify_change;
use nback_core::{ModalityStats, PerModality, RoundReport, RoundStats};
use rusqlite::{Connection, Row, params};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::schema;
use crate::time::now_iso8601;

const DB_FILE: &str = "nback.db";

const ROUND_COLUMNS: &str = "id, played_at, level, next_level, trials, total_errors,
    position_hits, position_misses, position_false_alarms, position_targets, position_d_prime,
    symbol_hits, symbol_misses, symbol_false_alarms, symbol_targets, symbol_d_prime";

/// A persisted round with its identity and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRound {
    pub id: Uuid,
    pub played_at: String,
    pub report: RoundReport,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Open `<base_dir>/nback.db`, creating the directory if needed.
    pub fn open_in_dir(base_dir: &Path) -> Result<Self> {
        fs::create_dir_all(base_dir)?;
        let path = base_dir.join(DB_FILE);
        tracing::debug!("opening round store at {}", path.display());
        Self::open(&path)
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get(0)).ok();
        Ok(result)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // --- Rounds ---

    pub fn record_round(&self, report: &RoundReport) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let played_at = now_iso8601();
        let s = &report.stats;

        self.conn.execute(
            &format!(
                "INSERT INTO rounds ({ROUND_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
            ),
            params![
                id.to_string(),
                played_at,
                report.level as i64,
                report.next_level as i64,
                report.trials as i64,
                report.total_errors,
                s.position.hits,
                s.position.misses,
                s.position.false_alarms,
                report.targets.position,
                report.d_prime.position,
                s.symbol.hits,
                s.symbol.misses,
                s.symbol.false_alarms,
                report.targets.symbol,
                report.d_prime.symbol,
            ],
        )?;

        tracing::info!(
            round = %id,
            level = report.level,
            next_level = report.next_level,
            "recorded round"
        );
        Ok(id)
    }

    /// Highest level ever reached, i.e. the best round score.
    pub fn best_level(&self) -> Result<Option<usize>> {
        let best: Option<i64> =
            self.conn
                .query_row("SELECT MAX(next_level) FROM rounds", [], |row| row.get(0))?;
        best.map(to_usize).transpose()
    }

    /// Level chosen by the most recent round, for resuming training.
    pub fn last_level(&self) -> Result<Option<usize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT next_level FROM rounds ORDER BY rowid DESC LIMIT 1")?;
        match stmt.query_row([], |row| row.get::<_, i64>(0)) {
            Ok(level) => to_usize(level).map(Some),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn round_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM rounds", [], |row| row.get(0))?;
        to_usize(count)
    }

    /// Most recent rounds first.
    pub fn recent_rounds(&self, limit: usize) -> Result<Vec<StoredRound>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ROUND_COLUMNS} FROM rounds ORDER BY rowid DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map([limit as i64], read_round_row)?;

        let mut rounds = Vec::new();
        for row in rows {
            let raw = row?;
            rounds.push(raw.into_stored()?);
        }
        Ok(rounds)
    }
}

/// Column values as SQLite returns them, before validation.
struct RawRound {
    id: String,
    played_at: String,
    level: i64,
    next_level: i64,
    trials: i64,
    total_errors: u32,
    position: ModalityStats,
    symbol: ModalityStats,
    targets: PerModality<u32>,
    d_prime: PerModality<f64>,
}

fn read_round_row(row: &Row<'_>) -> rusqlite::Result<RawRound> {
    Ok(RawRound {
        id: row.get(0)?,
        played_at: row.get(1)?,
        level: row.get(2)?,
        next_level: row.get(3)?,
        trials: row.get(4)?,
        total_errors: row.get(5)?,
        position: ModalityStats {
            hits: row.get(6)?,
            misses: row.get(7)?,
            false_alarms: row.get(8)?,
        },
        symbol: ModalityStats {
            hits: row.get(11)?,
            misses: row.get(12)?,
            false_alarms: row.get(13)?,
        },
        targets: PerModality {
            position: row.get(9)?,
            symbol: row.get(14)?,
        },
        d_prime: PerModality {
            position: row.get(10)?,
            symbol: row.get(15)?,
        },
    })
}

impl RawRound {
    fn into_stored(self) -> Result<StoredRound> {
        let id = parse_uuid(&self.id)?;
        let level = to_usize(self.level)?;
        let next_level = to_usize(self.next_level)?;
        let report = RoundReport {
            level,
            next_level,
            change: classify_change(level, next_level),
            trials: to_usize(self.trials)?,
            stats: RoundStats {
                position: self.position,
                symbol: self.symbol,
            },
            targets: self.targets,
            total_errors: self.total_errors,
            d_prime: self.d_prime,
        };
        Ok(StoredRound {
            id,
            played_at: self.played_at,
            report,
        })
    }
}

fn to_usize(v: i64) -> Result<usize> {
    usize::try_from(v).map_err(|_| StoreError::InvalidData(format!("negative count: {v}")))
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::InvalidData(format!("bad UUID '{s}': {e}")))
}
