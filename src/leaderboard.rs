use serde::{Deserialize, Serialize};

use crate::stats::{Metric, QualifiedPlayer, RankedPlayer};

/// The first `n` rows of a table already ordered by final rank.
/// Returns fewer rows when fewer players qualified.
pub fn top_n(ranked: &[RankedPlayer], n: usize) -> &[RankedPlayer] {
    &ranked[..n.min(ranked.len())]
}

/// Up to `n` rows with the largest raw `metric`, largest first.
///
/// A display view over the same rows: ranks are carried as-is. Equal values
/// keep their leaderboard order.
pub fn top_by(rows: &[RankedPlayer], metric: Metric, n: usize) -> Vec<&RankedPlayer> {
    let mut view: Vec<&RankedPlayer> = rows.iter().collect();
    view.sort_by(|a, b| b.player.metric(metric).total_cmp(&a.player.metric(metric)));
    view.truncate(n);
    view
}

/// The same rows ordered by composite score, lowest first.
pub fn by_composite(rows: &[RankedPlayer]) -> Vec<&RankedPlayer> {
    let mut view: Vec<&RankedPlayer> = rows.iter().collect();
    view.sort_by(|a, b| a.composite_score.total_cmp(&b.composite_score));
    view
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsRow {
    pub rank: usize,
    pub player: QualifiedPlayer,
}

/// Top `n` qualified players by fantasy points with a plain positional rank.
pub fn points_leaderboard(players: &[QualifiedPlayer], n: usize) -> Vec<PointsRow> {
    let mut sorted: Vec<&QualifiedPlayer> = players.iter().collect();
    sorted.sort_by(|a, b| b.fantasy_points.total_cmp(&a.fantasy_points));
    sorted
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(idx, p)| PointsRow {
            rank: idx + 1,
            player: p.clone(),
        })
        .collect()
}
