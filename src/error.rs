use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Rejected before any ranking is attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("no tracked metrics configured; composite score is undefined")]
    EmptyMetrics,
    #[error("minimum targets must be positive (got {0})")]
    NonPositiveThreshold(u32),
    #[error("metric {metric} has invalid weight {weight}")]
    InvalidWeight { metric: String, weight: f64 },
    #[error("scoring weight {field} is not finite ({weight})")]
    InvalidScoringWeight { field: &'static str, weight: f64 },
    #[error("metric {0} is tracked more than once")]
    DuplicateMetric(String),
    #[error("unknown season {0}")]
    UnknownSeason(u16),
    #[error("leaderboard size must be at least 1")]
    ZeroLeaderboardSize,
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("player {player_id}: missing required field {field}")]
    MissingField { player_id: String, field: &'static str },
    #[error("player {player_id}: invalid {field} value {value}")]
    InvalidValue {
        player_id: String,
        field: &'static str,
        value: f64,
    },
    #[error("player {player_id} appears more than once in season {season}")]
    DuplicatePlayer { player_id: String, season: u16 },
}

pub type Result<T> = std::result::Result<T, LeaderboardError>;
