use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::stats::{QualifiedPlayer, ScoredPlayer};

pub const DEFAULT_MIN_TARGETS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualification {
    pub season: u16,
    pub min_targets: u32,
}

impl Qualification {
    pub fn new(season: u16, min_targets: u32) -> Result<Self, ConfigError> {
        if min_targets == 0 {
            return Err(ConfigError::NonPositiveThreshold(min_targets));
        }
        Ok(Self {
            season,
            min_targets,
        })
    }
}

/// Keep the players from the selected season with enough targets.
///
/// Rows without a per-game rate are dropped here so ranking only ever sees
/// defined values. An empty result is valid.
pub fn qualify(rows: &[ScoredPlayer], rule: &Qualification) -> Vec<QualifiedPlayer> {
    let mut out = Vec::new();
    let mut no_rate = 0usize;
    for row in rows {
        if row.stat.season != rule.season || row.stat.targets < rule.min_targets {
            continue;
        }
        let Some(points_per_game) = row.points_per_game else {
            no_rate += 1;
            warn!(
                player_id = %row.stat.player_id,
                player = %row.stat.player_name,
                "excluding player with no games on record"
            );
            continue;
        };
        out.push(QualifiedPlayer {
            stat: row.stat.clone(),
            fantasy_points: row.fantasy_points,
            points_per_game,
        });
    }
    debug!(
        season = rule.season,
        min_targets = rule.min_targets,
        input = rows.len(),
        qualified = out.len(),
        no_rate,
        "qualification filter applied"
    );
    out
}
