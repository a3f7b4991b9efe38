use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::stats::{Metric, MetricRank, QualifiedPlayer, RankedPlayer};

/// Relative tolerance under which two composite scores count as tied.
pub const COMPOSITE_TIE_EPSILON: f64 = 1e-9;

/// How equal values share a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieRule {
    /// Tied values get the mean of the positions they span: 1, 2.5, 2.5, 4.
    #[default]
    Average,
    /// Tied values get the lowest position they span: 1, 2, 2, 4.
    Min,
}

impl TieRule {
    pub fn from_key(raw: &str) -> Option<TieRule> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "average" | "avg" | "mean" => Some(TieRule::Average),
            "min" | "minimum" | "competition" => Some(TieRule::Min),
            _ => None,
        }
    }
}

impl fmt::Display for TieRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieRule::Average => f.write_str("average"),
            TieRule::Min => f.write_str("min"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Largest value gets rank 1.
    Descending,
    /// Smallest value gets rank 1.
    Ascending,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricWeight {
    pub metric: Metric,
    pub weight: f64,
}

impl MetricWeight {
    pub fn new(metric: Metric, weight: f64) -> Self {
        Self { metric, weight }
    }
}

pub fn default_metric_weights() -> Vec<MetricWeight> {
    vec![
        MetricWeight::new(Metric::FantasyPoints, 0.4),
        MetricWeight::new(Metric::TargetShare, 0.3),
        MetricWeight::new(Metric::PointsPerGame, 0.3),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSpec {
    pub metrics: Vec<MetricWeight>,
    pub tie_rule: TieRule,
}

impl Default for RankingSpec {
    fn default() -> Self {
        Self {
            metrics: default_metric_weights(),
            tie_rule: TieRule::default(),
        }
    }
}

impl RankingSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics.is_empty() {
            return Err(ConfigError::EmptyMetrics);
        }
        for (idx, mw) in self.metrics.iter().enumerate() {
            if !mw.weight.is_finite() || mw.weight <= 0.0 {
                return Err(ConfigError::InvalidWeight {
                    metric: mw.metric.to_string(),
                    weight: mw.weight,
                });
            }
            if self.metrics[..idx].iter().any(|m| m.metric == mw.metric) {
                return Err(ConfigError::DuplicateMetric(mw.metric.to_string()));
            }
        }
        Ok(())
    }
}

/// Assign 1-based ranks to `values` under `rule`.
///
/// Values within `rel_tolerance` of the first value of a run are tied with it;
/// pass 0.0 for exact equality. Returned ranks line up with the input indices.
pub fn rank_values(values: &[f64], order: Order, rule: TieRule, rel_tolerance: f64) -> Vec<f64> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    // Stable sort keeps input order among equal values.
    idx.sort_by(|&a, &b| match order {
        Order::Descending => values[b].total_cmp(&values[a]),
        Order::Ascending => values[a].total_cmp(&values[b]),
    });

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0usize;
    while start < idx.len() {
        let anchor = values[idx[start]];
        let mut end = start + 1;
        while end < idx.len() && is_tied(anchor, values[idx[end]], rel_tolerance) {
            end += 1;
        }
        // Positions start+1 ..= end share one rank.
        let rank = match rule {
            TieRule::Average => (start + 1 + end) as f64 / 2.0,
            TieRule::Min => (start + 1) as f64,
        };
        for &i in &idx[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }
    ranks
}

fn is_tied(a: f64, b: f64, rel_tolerance: f64) -> bool {
    if a == b {
        return true;
    }
    let scale = 1.0_f64.max(a.abs()).max(b.abs());
    (a - b).abs() <= rel_tolerance * scale
}

/// Rank each tracked metric, combine the ranks into a composite score and rank
/// that. The result is ordered by final rank; tied players keep input order.
pub fn rank_players(
    players: &[QualifiedPlayer],
    spec: &RankingSpec,
) -> Result<Vec<RankedPlayer>, ConfigError> {
    spec.validate()?;

    let per_metric: Vec<(Metric, f64, Vec<f64>)> = spec
        .metrics
        .iter()
        .map(|mw| {
            let values: Vec<f64> = players.iter().map(|p| p.metric(mw.metric)).collect();
            let ranks = rank_values(&values, Order::Descending, spec.tie_rule, 0.0);
            (mw.metric, mw.weight, ranks)
        })
        .collect();

    let composite: Vec<f64> = (0..players.len())
        .map(|i| {
            per_metric
                .iter()
                .map(|(_, weight, ranks)| weight * ranks[i])
                .sum()
        })
        .collect();
    let final_ranks = rank_values(
        &composite,
        Order::Ascending,
        spec.tie_rule,
        COMPOSITE_TIE_EPSILON,
    );

    let mut out: Vec<RankedPlayer> = players
        .iter()
        .enumerate()
        .map(|(i, p)| RankedPlayer {
            player: p.clone(),
            ranks: per_metric
                .iter()
                .map(|(metric, _, ranks)| MetricRank {
                    metric: *metric,
                    rank: ranks[i],
                })
                .collect(),
            composite_score: composite[i],
            final_rank: final_ranks[i],
        })
        .collect();
    out.sort_by(|a, b| a.final_rank.total_cmp(&b.final_rank));

    debug!(
        players = out.len(),
        metrics = spec.metrics.len(),
        tie_rule = %spec.tie_rule,
        "ranked qualified players"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_rule_splits_tied_positions() {
        let r = rank_values(&[10.0, 7.0, 7.0, 3.0], Order::Descending, TieRule::Average, 0.0);
        assert_eq!(r, vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn min_rule_uses_lowest_position() {
        let r = rank_values(&[10.0, 7.0, 7.0, 3.0], Order::Descending, TieRule::Min, 0.0);
        assert_eq!(r, vec![1.0, 2.0, 2.0, 4.0]);
    }

    #[test]
    fn ascending_ranks_smallest_first() {
        let r = rank_values(&[2.2, 1.0, 3.5], Order::Ascending, TieRule::Average, 0.0);
        assert_eq!(r, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn tolerance_merges_rounding_noise() {
        let a = 0.1 + 0.2;
        let b = 0.3;
        let exact = rank_values(&[a, b], Order::Ascending, TieRule::Min, 0.0);
        let loose = rank_values(&[a, b], Order::Ascending, TieRule::Min, COMPOSITE_TIE_EPSILON);
        assert_eq!(exact, vec![2.0, 1.0]);
        assert_eq!(loose, vec![1.0, 1.0]);
    }

    #[test]
    fn empty_input_has_no_ranks() {
        assert!(rank_values(&[], Order::Descending, TieRule::Average, 0.0).is_empty());
    }

    #[test]
    fn spec_rejects_empty_and_duplicate_metrics() {
        let empty = RankingSpec {
            metrics: Vec::new(),
            tie_rule: TieRule::Average,
        };
        assert_eq!(empty.validate(), Err(ConfigError::EmptyMetrics));

        let dup = RankingSpec {
            metrics: vec![
                MetricWeight::new(Metric::TargetShare, 0.5),
                MetricWeight::new(Metric::TargetShare, 0.5),
            ],
            tie_rule: TieRule::Min,
        };
        assert!(matches!(dup.validate(), Err(ConfigError::DuplicateMetric(_))));
    }

    #[test]
    fn tie_rule_parses_aliases() {
        assert_eq!(TieRule::from_key("AVG"), Some(TieRule::Average));
        assert_eq!(TieRule::from_key("minimum"), Some(TieRule::Min));
        assert_eq!(TieRule::from_key("dense"), None);
    }
}
