use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DataError;
use crate::stats::PlayerSeasonStat;

pub const REGULAR_SEASON: &str = "REG";

/// Seasonal receiving totals as published by the stats source, before the roster join.
/// Numeric columns may be null upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalTotals {
    pub player_id: String,
    pub season: u16,
    #[serde(default = "regular_season")]
    pub season_type: String,
    pub games: Option<u32>,
    pub targets: Option<u32>,
    pub target_share: Option<f64>,
    pub receptions: Option<u32>,
    pub receiving_yards: Option<f64>,
    pub receiving_tds: Option<u32>,
}

fn regular_season() -> String {
    REGULAR_SEASON.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_id: String,
    pub player_name: String,
    pub position: String,
    pub season: u16,
}

/// Join totals with roster names/positions and keep regular-season rows for `position`.
///
/// Roster entries match on player id and season; the first entry for a pair
/// wins. Totals without a roster match for their season are dropped.
pub fn join_roster(
    totals: &[SeasonalTotals],
    roster: &[RosterEntry],
    position: &str,
) -> Result<Vec<PlayerSeasonStat>, DataError> {
    let mut by_key: HashMap<(&str, u16), &RosterEntry> = HashMap::with_capacity(roster.len());
    for entry in roster {
        by_key
            .entry((entry.player_id.as_str(), entry.season))
            .or_insert(entry);
    }

    let mut out = Vec::new();
    let mut unmatched = 0usize;
    for row in totals {
        if !row.season_type.eq_ignore_ascii_case(REGULAR_SEASON) {
            continue;
        }
        let Some(entry) = by_key.get(&(row.player_id.as_str(), row.season)) else {
            unmatched += 1;
            continue;
        };
        if !entry.position.eq_ignore_ascii_case(position) {
            continue;
        }
        out.push(to_season_stat(row, entry)?);
    }
    debug!(
        position,
        totals = totals.len(),
        joined = out.len(),
        unmatched,
        "joined seasonal totals with roster"
    );
    Ok(out)
}

fn to_season_stat(row: &SeasonalTotals, entry: &RosterEntry) -> Result<PlayerSeasonStat, DataError> {
    let missing = |field: &'static str| DataError::MissingField {
        player_id: row.player_id.clone(),
        field,
    };
    Ok(PlayerSeasonStat {
        player_id: row.player_id.clone(),
        player_name: entry.player_name.clone(),
        season: row.season,
        position: entry.position.to_ascii_uppercase(),
        games: row.games.ok_or_else(|| missing("games"))?,
        targets: row.targets.ok_or_else(|| missing("targets"))?,
        target_share: row
            .target_share
            .filter(|v| !v.is_nan())
            .ok_or_else(|| missing("target_share"))?,
        receptions: row.receptions.ok_or_else(|| missing("receptions"))?,
        receiving_yards: row
            .receiving_yards
            .filter(|v| !v.is_nan())
            .ok_or_else(|| missing("receiving_yards"))?,
        receiving_tds: row.receiving_tds.ok_or_else(|| missing("receiving_tds"))?,
    })
}
