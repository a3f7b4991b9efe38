use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, DataError};
use crate::stats::{PlayerSeasonStat, ScoredPlayer};

/// Point values per unit of production. Defaults are full PPR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub per_yard: f64,
    pub per_td: f64,
    pub per_reception: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            per_yard: 0.1,
            per_td: 6.0,
            per_reception: 1.0,
        }
    }
}

impl ScoringWeights {
    pub fn half_ppr() -> Self {
        Self {
            per_reception: 0.5,
            ..Self::default()
        }
    }

    pub fn standard() -> Self {
        Self {
            per_reception: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, weight) in [
            ("per_yard", self.per_yard),
            ("per_td", self.per_td),
            ("per_reception", self.per_reception),
        ] {
            if !weight.is_finite() {
                return Err(ConfigError::InvalidScoringWeight { field, weight });
            }
        }
        Ok(())
    }

    pub fn points(&self, stat: &PlayerSeasonStat) -> f64 {
        stat.receiving_yards * self.per_yard
            + stat.receiving_tds as f64 * self.per_td
            + stat.receptions as f64 * self.per_reception
    }
}

/// Derive fantasy points and the per-game rate for every row.
///
/// Output has one row per input row. A player with zero games keeps their
/// point total but gets no per-game rate.
pub fn derive_scores(
    rows: &[PlayerSeasonStat],
    weights: &ScoringWeights,
) -> Result<Vec<ScoredPlayer>, DataError> {
    let mut seen: HashSet<(u16, &str)> = HashSet::with_capacity(rows.len());
    let mut out = Vec::with_capacity(rows.len());
    for stat in rows {
        stat.validate()?;
        if !seen.insert((stat.season, stat.player_id.as_str())) {
            return Err(DataError::DuplicatePlayer {
                player_id: stat.player_id.clone(),
                season: stat.season,
            });
        }
        out.push(score_row(stat, weights));
    }
    debug!(rows = out.len(), "derived fantasy scores");
    Ok(out)
}

fn score_row(stat: &PlayerSeasonStat, weights: &ScoringWeights) -> ScoredPlayer {
    let fantasy_points = weights.points(stat);
    let points_per_game = if stat.games > 0 {
        Some(fantasy_points / stat.games as f64)
    } else {
        None
    };
    ScoredPlayer {
        stat: stat.clone(),
        fantasy_points,
        points_per_game,
    }
}
