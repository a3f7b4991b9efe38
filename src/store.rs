use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::info;

use crate::error::{ConfigError, LeaderboardError};
use crate::roster::{RosterEntry, SeasonalTotals, join_roster};
use crate::stats::PlayerSeasonStat;

const CACHE_DIR: &str = "wr_leaderboard";
const DB_FILE: &str = "stats.sqlite";

pub fn default_db_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(DB_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR).join(DB_FILE))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS seasonal_totals (
            player_id TEXT NOT NULL,
            season INTEGER NOT NULL,
            season_type TEXT NOT NULL,
            games INTEGER NULL,
            targets INTEGER NULL,
            target_share REAL NULL,
            receptions INTEGER NULL,
            receiving_yards REAL NULL,
            receiving_tds INTEGER NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (player_id, season, season_type)
        );
        CREATE INDEX IF NOT EXISTS idx_totals_season ON seasonal_totals(season);

        CREATE TABLE IF NOT EXISTS roster (
            player_id TEXT NOT NULL,
            season INTEGER NOT NULL,
            player_name TEXT NOT NULL,
            position TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (player_id, season)
        );

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            finished_at TEXT NOT NULL,
            source TEXT NOT NULL,
            totals_upserted INTEGER NOT NULL,
            roster_inserted INTEGER NOT NULL
        );
        "#,
    )
    .context("init sqlite schema")?;
    Ok(())
}

pub fn upsert_totals(conn: &mut Connection, rows: &[SeasonalTotals]) -> Result<usize> {
    let updated_at = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin totals transaction")?;
    for row in rows {
        tx.execute(
            r#"
            INSERT INTO seasonal_totals (
                player_id, season, season_type, games, targets, target_share,
                receptions, receiving_yards, receiving_tds, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(player_id, season, season_type) DO UPDATE SET
                games = excluded.games,
                targets = excluded.targets,
                target_share = excluded.target_share,
                receptions = excluded.receptions,
                receiving_yards = excluded.receiving_yards,
                receiving_tds = excluded.receiving_tds,
                updated_at = excluded.updated_at
            "#,
            params![
                row.player_id,
                row.season,
                row.season_type,
                row.games,
                row.targets,
                row.target_share,
                row.receptions,
                row.receiving_yards,
                row.receiving_tds,
                updated_at,
            ],
        )
        .with_context(|| format!("upsert totals for {}", row.player_id))?;
    }
    tx.commit().context("commit totals transaction")?;
    Ok(rows.len())
}

/// Insert roster entries, keeping the stored entry when (player, season) exists.
/// Returns the number of rows actually inserted.
pub fn insert_roster(conn: &mut Connection, rows: &[RosterEntry]) -> Result<usize> {
    let updated_at = Utc::now().to_rfc3339();
    let tx = conn.transaction().context("begin roster transaction")?;
    let mut inserted = 0usize;
    for row in rows {
        inserted += tx.execute(
            r#"
            INSERT INTO roster (player_id, season, player_name, position, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(player_id, season) DO NOTHING
            "#,
            params![row.player_id, row.season, row.player_name, row.position, updated_at],
        )
        .with_context(|| format!("insert roster entry {}", row.player_id))?;
    }
    tx.commit().context("commit roster transaction")?;
    Ok(inserted)
}

pub fn record_ingest_run(
    conn: &Connection,
    source: &str,
    totals_upserted: usize,
    roster_inserted: usize,
) -> Result<()> {
    conn.execute(
        "INSERT INTO ingest_runs (finished_at, source, totals_upserted, roster_inserted)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            Utc::now().to_rfc3339(),
            source,
            totals_upserted as i64,
            roster_inserted as i64
        ],
    )
    .context("insert ingest run")?;
    info!(source, totals_upserted, roster_inserted, "ingest run recorded");
    Ok(())
}

pub fn known_seasons(conn: &Connection) -> Result<Vec<u16>> {
    let mut stmt = conn
        .prepare("SELECT DISTINCT season FROM seasonal_totals ORDER BY season ASC")
        .context("prepare seasons query")?;
    let seasons = stmt
        .query_map([], |row| row.get::<_, u16>(0))
        .context("query seasons")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read seasons")?;
    Ok(seasons)
}

pub fn load_totals(conn: &Connection, season: u16) -> Result<Vec<SeasonalTotals>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT player_id, season, season_type, games, targets, target_share,
                   receptions, receiving_yards, receiving_tds
            FROM seasonal_totals
            WHERE season = ?1
            ORDER BY player_id ASC, season_type ASC
            "#,
        )
        .context("prepare totals query")?;
    let rows = stmt
        .query_map(params![season], |row| {
            Ok(SeasonalTotals {
                player_id: row.get(0)?,
                season: row.get(1)?,
                season_type: row.get(2)?,
                games: row.get(3)?,
                targets: row.get(4)?,
                target_share: row.get(5)?,
                receptions: row.get(6)?,
                receiving_yards: row.get(7)?,
                receiving_tds: row.get(8)?,
            })
        })
        .context("query totals")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read totals")?;
    Ok(rows)
}

pub fn load_roster(conn: &Connection, season: u16) -> Result<Vec<RosterEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT player_id, player_name, position, season FROM roster
             WHERE season = ?1 ORDER BY player_id ASC",
        )
        .context("prepare roster query")?;
    let rows = stmt
        .query_map(params![season], |row| {
            Ok(RosterEntry {
                player_id: row.get(0)?,
                player_name: row.get(1)?,
                position: row.get(2)?,
                season: row.get(3)?,
            })
        })
        .context("query roster")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("read roster")?;
    Ok(rows)
}

/// The joined, position-filtered table for one season.
///
/// A season with no stored totals fails with `ConfigError::UnknownSeason`.
pub fn load_season(conn: &Connection, season: u16, position: &str) -> Result<Vec<PlayerSeasonStat>> {
    if !known_seasons(conn)?.contains(&season) {
        return Err(LeaderboardError::from(ConfigError::UnknownSeason(season)).into());
    }
    let totals = load_totals(conn, season)?;
    let roster = load_roster(conn, season)?;
    let rows = join_roster(&totals, &roster, position).map_err(LeaderboardError::from)?;
    info!(season, position, rows = rows.len(), "season table loaded");
    Ok(rows)
}
