use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::qualify::{DEFAULT_MIN_TARGETS, Qualification};
use crate::rank::{MetricWeight, RankingSpec, TieRule, default_metric_weights};
use crate::scoring::ScoringWeights;
use crate::stats::Metric;

pub const DEFAULT_SEASON: u16 = 2024;
pub const DEFAULT_POSITION: &str = "WR";
pub const DEFAULT_SIZES: &[usize] = &[20, 50, 100];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    pub season: u16,
    pub position: String,
    pub min_targets: u32,
    pub scoring: ScoringWeights,
    pub metrics: Vec<MetricWeight>,
    pub tie_rule: TieRule,
    pub leaderboard_sizes: Vec<usize>,
    pub db_path: Option<PathBuf>,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            season: DEFAULT_SEASON,
            position: DEFAULT_POSITION.to_string(),
            min_targets: DEFAULT_MIN_TARGETS,
            scoring: ScoringWeights::default(),
            metrics: default_metric_weights(),
            tie_rule: TieRule::default(),
            leaderboard_sizes: DEFAULT_SIZES.to_vec(),
            db_path: None,
        }
    }
}

impl LeaderboardConfig {
    /// Defaults overlaid with `.env` and process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for the `WR_*` keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get("WR_SEASON") {
            cfg.season = parse_num("WR_SEASON", &raw)?;
        }
        if let Some(raw) = get("WR_POSITION") {
            cfg.position = raw.trim().to_ascii_uppercase();
        }
        if let Some(raw) = get("WR_MIN_TARGETS") {
            cfg.min_targets = parse_num("WR_MIN_TARGETS", &raw)?;
        }
        if let Some(raw) = get("WR_SCORING") {
            cfg.scoring = parse_scoring(&raw)?;
        }
        if let Some(raw) = get("WR_METRICS") {
            cfg.metrics = parse_metrics(&raw)?;
        }
        if let Some(raw) = get("WR_TIE_RULE") {
            cfg.tie_rule = parse_tie_rule(&raw)?;
        }
        if let Some(raw) = get("WR_SIZES") {
            cfg.leaderboard_sizes = parse_sizes(&raw)?;
        }
        if let Some(raw) = get("WR_DB_PATH") {
            cfg.db_path = Some(PathBuf::from(raw.trim()));
        }
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.ranking_spec().validate()?;
        Qualification::new(self.season, self.min_targets)?;
        if self.leaderboard_sizes.contains(&0) {
            return Err(ConfigError::ZeroLeaderboardSize);
        }
        Ok(())
    }

    pub fn qualification(&self) -> Result<Qualification, ConfigError> {
        Qualification::new(self.season, self.min_targets)
    }

    pub fn ranking_spec(&self) -> RankingSpec {
        RankingSpec {
            metrics: self.metrics.clone(),
            tie_rule: self.tie_rule,
        }
    }

    /// Largest requested leaderboard size; the primary table in reports.
    pub fn max_size(&self) -> usize {
        self.leaderboard_sizes.iter().copied().max().unwrap_or(0)
    }
}

pub fn parse_num<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| invalid(key, raw))
}

/// `yards,td,reception`, e.g. `0.1,6,1`.
pub fn parse_scoring(raw: &str) -> Result<ScoringWeights, ConfigError> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let [yards, td, rec] = parts.as_slice() else {
        return Err(invalid("WR_SCORING", raw));
    };
    Ok(ScoringWeights {
        per_yard: parse_num("WR_SCORING", yards)?,
        per_td: parse_num("WR_SCORING", td)?,
        per_reception: parse_num("WR_SCORING", rec)?,
    })
}

/// `metric:weight,...`, e.g. `fantasy_points:0.4,target_share:0.3,ppg:0.3`.
pub fn parse_metrics(raw: &str) -> Result<Vec<MetricWeight>, ConfigError> {
    let mut out = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((name, weight)) = item.split_once(':') else {
            return Err(invalid("WR_METRICS", item));
        };
        let metric = Metric::from_key(name).ok_or_else(|| invalid("WR_METRICS", name))?;
        out.push(MetricWeight::new(metric, parse_num("WR_METRICS", weight)?));
    }
    Ok(out)
}

pub fn parse_tie_rule(raw: &str) -> Result<TieRule, ConfigError> {
    TieRule::from_key(raw).ok_or_else(|| invalid("WR_TIE_RULE", raw))
}

pub fn parse_sizes(raw: &str) -> Result<Vec<usize>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_num("WR_SIZES", s))
        .collect()
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
