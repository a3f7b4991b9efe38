use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// One player's regular-season receiving totals, already joined with the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonStat {
    pub player_id: String,
    pub player_name: String,
    pub season: u16,
    pub position: String,
    pub games: u32,
    pub targets: u32,
    /// Fraction of team targets, 0..=1.
    pub target_share: f64,
    pub receptions: u32,
    pub receiving_yards: f64,
    pub receiving_tds: u32,
}

impl PlayerSeasonStat {
    pub fn validate(&self) -> Result<(), DataError> {
        if !self.target_share.is_finite() || !(0.0..=1.0).contains(&self.target_share) {
            return Err(DataError::InvalidValue {
                player_id: self.player_id.clone(),
                field: "target_share",
                value: self.target_share,
            });
        }
        if !self.receiving_yards.is_finite() {
            return Err(DataError::InvalidValue {
                player_id: self.player_id.clone(),
                field: "receiving_yards",
                value: self.receiving_yards,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPlayer {
    pub stat: PlayerSeasonStat,
    pub fantasy_points: f64,
    /// `None` when the player has no games on record.
    pub points_per_game: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifiedPlayer {
    pub stat: PlayerSeasonStat,
    pub fantasy_points: f64,
    pub points_per_game: f64,
}

impl QualifiedPlayer {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::FantasyPoints => self.fantasy_points,
            Metric::TargetShare => self.stat.target_share,
            Metric::PointsPerGame => self.points_per_game,
            Metric::Targets => self.stat.targets as f64,
            Metric::Receptions => self.stat.receptions as f64,
            Metric::ReceivingYards => self.stat.receiving_yards,
            Metric::ReceivingTds => self.stat.receiving_tds as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    FantasyPoints,
    TargetShare,
    PointsPerGame,
    Targets,
    Receptions,
    ReceivingYards,
    ReceivingTds,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::FantasyPoints,
        Metric::TargetShare,
        Metric::PointsPerGame,
        Metric::Targets,
        Metric::Receptions,
        Metric::ReceivingYards,
        Metric::ReceivingTds,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Metric::FantasyPoints => "fantasy_points",
            Metric::TargetShare => "target_share",
            Metric::PointsPerGame => "points_per_game",
            Metric::Targets => "targets",
            Metric::Receptions => "receptions",
            Metric::ReceivingYards => "receiving_yards",
            Metric::ReceivingTds => "receiving_tds",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::FantasyPoints => "PPR Points",
            Metric::TargetShare => "Target Share",
            Metric::PointsPerGame => "PPG",
            Metric::Targets => "Targets",
            Metric::Receptions => "Receptions",
            Metric::ReceivingYards => "Yards",
            Metric::ReceivingTds => "TDs",
        }
    }

    pub fn from_key(raw: &str) -> Option<Metric> {
        let s = raw.trim().to_ascii_lowercase();
        // Accept the short names used in reports as well.
        match s.as_str() {
            "fantasy_points" | "ppr_points" | "points" => Some(Metric::FantasyPoints),
            "target_share" => Some(Metric::TargetShare),
            "points_per_game" | "ppg" => Some(Metric::PointsPerGame),
            "targets" => Some(Metric::Targets),
            "receptions" => Some(Metric::Receptions),
            "receiving_yards" | "yards" => Some(Metric::ReceivingYards),
            "receiving_tds" | "tds" => Some(Metric::ReceivingTds),
            _ => None,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRank {
    pub metric: Metric,
    pub rank: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub player: QualifiedPlayer,
    pub ranks: Vec<MetricRank>,
    pub composite_score: f64,
    pub final_rank: f64,
}

impl RankedPlayer {
    pub fn rank_for(&self, metric: Metric) -> Option<f64> {
        self.ranks
            .iter()
            .find(|r| r.metric == metric)
            .map(|r| r.rank)
    }

    pub fn name(&self) -> &str {
        &self.player.stat.player_name
    }
}
