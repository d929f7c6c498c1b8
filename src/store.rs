use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};

use crate::error::{FeatureError, Result};
use crate::features::FeatureTable;
use crate::fight_table::{FightRecord, SideStats};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub rows_upserted: usize,
    pub earliest_date: Option<String>,
    pub latest_date: Option<String>,
    pub errors: Vec<String>,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS fights (
            fight_id TEXT PRIMARY KEY,
            seq INTEGER NOT NULL,
            date TEXT NOT NULL,
            fighter_a_id TEXT NOT NULL,
            fighter_b_id TEXT NOT NULL,
            winner_id TEXT NULL,
            division TEXT NOT NULL,
            location TEXT NOT NULL,
            outcome_method TEXT NOT NULL,
            outcome_round INTEGER NOT NULL,
            outcome_time TEXT NOT NULL,
            outcome_format TEXT NOT NULL,
            fighter_a_stats TEXT NOT NULL,
            fighter_b_stats TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_fights_date ON fights(date, seq);
        CREATE INDEX IF NOT EXISTS idx_fights_a ON fights(fighter_a_id);
        CREATE INDEX IF NOT EXISTS idx_fights_b ON fights(fighter_b_id);

        CREATE TABLE IF NOT EXISTS fight_features (
            fight_id TEXT PRIMARY KEY,
            row_index INTEGER NOT NULL,
            values_json TEXT NOT NULL,
            computed_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS import_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            source TEXT NOT NULL,
            rows_read INTEGER NOT NULL,
            rows_upserted INTEGER NOT NULL,
            errors_json TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Inserts or replaces fights by `fight_id` in one transaction. New ids are
/// appended to the tie-break order; existing ids keep their position.
pub fn upsert_fights(conn: &mut Connection, fights: &[FightRecord]) -> Result<usize> {
    let tx = conn.transaction()?;
    let mut next_seq: i64 = tx.query_row("SELECT COALESCE(MAX(seq) + 1, 0) FROM fights", [], |row| {
        row.get(0)
    })?;
    let now = Utc::now().to_rfc3339();
    let mut upserted = 0usize;
    for fight in fights {
        let a_stats = serde_json::to_string(&fight.fighter_a_stats)?;
        let b_stats = serde_json::to_string(&fight.fighter_b_stats)?;
        tx.execute(
            r#"
            INSERT INTO fights (
                fight_id, seq, date, fighter_a_id, fighter_b_id, winner_id,
                division, location, outcome_method, outcome_round, outcome_time,
                outcome_format, fighter_a_stats, fighter_b_stats, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15
            )
            ON CONFLICT(fight_id) DO UPDATE SET
                date = excluded.date,
                fighter_a_id = excluded.fighter_a_id,
                fighter_b_id = excluded.fighter_b_id,
                winner_id = excluded.winner_id,
                division = excluded.division,
                location = excluded.location,
                outcome_method = excluded.outcome_method,
                outcome_round = excluded.outcome_round,
                outcome_time = excluded.outcome_time,
                outcome_format = excluded.outcome_format,
                fighter_a_stats = excluded.fighter_a_stats,
                fighter_b_stats = excluded.fighter_b_stats,
                updated_at = excluded.updated_at
            "#,
            params![
                fight.fight_id,
                next_seq,
                fight.date.format(DATE_FORMAT).to_string(),
                fight.fighter_a_id,
                fight.fighter_b_id,
                fight.winner_id,
                fight.division,
                fight.location,
                fight.outcome_method,
                i64::from(fight.outcome_round),
                fight.outcome_time,
                fight.outcome_format,
                a_stats,
                b_stats,
                now,
            ],
        )?;
        next_seq += 1;
        upserted += 1;
    }
    tx.commit()?;
    Ok(upserted)
}

struct RawFight {
    record: FightRecord,
    date: String,
    a_stats: String,
    b_stats: String,
}

/// All stored fights, ordered by date then first-insert order.
pub fn load_fights(conn: &Connection) -> Result<Vec<FightRecord>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT
            fight_id, date, fighter_a_id, fighter_b_id, winner_id,
            division, location, outcome_method, outcome_round, outcome_time,
            outcome_format, fighter_a_stats, fighter_b_stats
        FROM fights
        ORDER BY date ASC, seq ASC
        "#,
    )?;
    let rows = stmt.query_map([], |row| {
        let mut record = FightRecord::new(
            row.get::<_, String>(0)?,
            NaiveDate::MIN,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            None,
            row.get::<_, String>(7)?,
            row.get::<_, u8>(8)?,
            row.get::<_, String>(9)?,
        );
        record.winner_id = row.get(4)?;
        record.division = row.get(5)?;
        record.location = row.get(6)?;
        record.outcome_format = row.get(10)?;
        Ok(RawFight {
            record,
            date: row.get(1)?,
            a_stats: row.get(11)?,
            b_stats: row.get(12)?,
        })
    })?;

    let mut out = Vec::new();
    for (idx, row) in rows.enumerate() {
        let RawFight {
            mut record,
            date,
            a_stats,
            b_stats,
        } = row?;
        record.date = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|err| {
            FeatureError::malformed(idx, &record.fighter_a_id, format!("bad date {date:?}: {err}"))
        })?;
        record.fighter_a_stats = serde_json::from_str::<SideStats>(&a_stats)?;
        record.fighter_b_stats = serde_json::from_str::<SideStats>(&b_stats)?;
        out.push(record);
    }
    Ok(out)
}

pub fn count_fights(conn: &Connection) -> Result<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM fights", [], |row| row.get(0))?;
    Ok(usize::try_from(n).unwrap_or(0))
}

pub fn date_range(conn: &Connection) -> Result<(Option<String>, Option<String>)> {
    Ok(conn.query_row("SELECT MIN(date), MAX(date) FROM fights", [], |row| {
        Ok((row.get(0)?, row.get(1)?))
    })?)
}

/// Replaces the stored feature table.
pub fn save_features(conn: &mut Connection, features: &FeatureTable) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM fight_features", [])?;
    let now = Utc::now().to_rfc3339();
    let mut saved = 0usize;
    for (idx, row) in features.rows().iter().enumerate() {
        let Some(named) = features.named_row(idx) else {
            continue;
        };
        let json = serde_json::to_string(&Value::Object(named))?;
        tx.execute(
            "INSERT INTO fight_features(fight_id, row_index, values_json, computed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![row.fight_id, row.index as i64, json, now],
        )?;
        saved += 1;
    }
    tx.commit()?;
    Ok(saved)
}

pub fn load_feature_row(conn: &Connection, fight_id: &str) -> Result<Option<Map<String, Value>>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT values_json FROM fight_features WHERE fight_id = ?1",
            params![fight_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(json) = json else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(&json)? {
        Value::Object(map) => Ok(Some(map)),
        _ => Ok(None),
    }
}

pub fn record_import_run(conn: &Connection, source: &str, summary: &ImportSummary) -> Result<i64> {
    let errors_json = serde_json::to_string(&summary.errors)?;
    conn.execute(
        "INSERT INTO import_runs(started_at, source, rows_read, rows_upserted, errors_json)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            Utc::now().to_rfc3339(),
            source,
            summary.rows_read as i64,
            summary.rows_upserted as i64,
            errors_json
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
