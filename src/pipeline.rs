use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::LeaderboardConfig;
use crate::error::Result;
use crate::leaderboard;
use crate::qualify::{Qualification, qualify};
use crate::rank::{RankingSpec, rank_players};
use crate::scoring::{ScoringWeights, derive_scores};
use crate::stats::{PlayerSeasonStat, QualifiedPlayer, RankedPlayer};

/// Everything one run produced, from qualified rows to the final ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub qualification: Qualification,
    pub scoring: ScoringWeights,
    pub ranking: RankingSpec,
    pub input_rows: usize,
    pub qualified: Vec<QualifiedPlayer>,
    /// Ordered by final rank.
    pub ranked: Vec<RankedPlayer>,
}

impl Leaderboard {
    pub fn top(&self, n: usize) -> &[RankedPlayer] {
        leaderboard::top_n(&self.ranked, n)
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Score, qualify and rank one season table.
///
/// Configuration is checked before any row is touched.
pub fn run(table: &[PlayerSeasonStat], config: &LeaderboardConfig) -> Result<Leaderboard> {
    config.validate()?;
    let qualification = config.qualification()?;
    let spec = config.ranking_spec();

    let scored = derive_scores(table, &config.scoring)?;
    let qualified = qualify(&scored, &qualification);
    let ranked = rank_players(&qualified, &spec)?;

    info!(
        season = qualification.season,
        input = table.len(),
        qualified = qualified.len(),
        "leaderboard computed"
    );
    Ok(Leaderboard {
        qualification,
        scoring: config.scoring,
        ranking: spec,
        input_rows: table.len(),
        qualified,
        ranked,
    })
}

/// Run several configurations over the same table in parallel.
/// Results line up with `configs`.
pub fn run_many(
    table: &[PlayerSeasonStat],
    configs: &[LeaderboardConfig],
) -> Vec<Result<Leaderboard>> {
    configs.par_iter().map(|cfg| run(table, cfg)).collect()
}
