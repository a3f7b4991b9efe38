use wr_leaderboard::error::ConfigError;
use wr_leaderboard::qualify::{Qualification, qualify};
use wr_leaderboard::rank::{MetricWeight, RankingSpec, TieRule, rank_players};
use wr_leaderboard::scoring::{ScoringWeights, derive_scores};
use wr_leaderboard::stats::{Metric, PlayerSeasonStat, QualifiedPlayer};

fn player(
    id: &str,
    targets: u32,
    share: f64,
    receptions: u32,
    yards: f64,
    tds: u32,
    games: u32,
) -> PlayerSeasonStat {
    PlayerSeasonStat {
        player_id: id.to_string(),
        player_name: id.to_uppercase(),
        season: 2024,
        position: "WR".to_string(),
        games,
        targets,
        target_share: share,
        receptions,
        receiving_yards: yards,
        receiving_tds: tds,
    }
}

fn qualified(rows: &[PlayerSeasonStat]) -> Vec<QualifiedPlayer> {
    let scored = derive_scores(rows, &ScoringWeights::default()).expect("valid rows");
    qualify(&scored, &Qualification::new(2024, 30).expect("valid rule"))
}

fn spec(metrics: &[(Metric, f64)], tie_rule: TieRule) -> RankingSpec {
    RankingSpec {
        metrics: metrics
            .iter()
            .map(|(m, w)| MetricWeight::new(*m, *w))
            .collect(),
        tie_rule,
    }
}

#[test]
fn two_player_example_ranks_higher_scorer_first() {
    let rows = qualified(&[
        player("a", 50, 0.25, 40, 500.0, 4, 16),
        player("b", 35, 0.18, 30, 450.0, 2, 16),
    ]);
    assert_eq!(rows.len(), 2);

    let ranked = rank_players(&rows, &RankingSpec::default()).expect("ranked");
    let a = &ranked[0];
    let b = &ranked[1];
    assert_eq!(a.player.stat.player_id, "a");
    assert!((a.player.fantasy_points - 114.0).abs() < 1e-9);
    assert!((b.player.fantasy_points - 87.0).abs() < 1e-9);
    assert_eq!(a.rank_for(Metric::FantasyPoints), Some(1.0));
    assert_eq!(b.rank_for(Metric::FantasyPoints), Some(2.0));
    assert!((a.composite_score - 1.0).abs() < 1e-9);
    assert!((b.composite_score - 2.0).abs() < 1e-9);
    assert_eq!(a.final_rank, 1.0);
    assert_eq!(b.final_rank, 2.0);

    let again = rank_players(&rows, &RankingSpec::default()).expect("ranked");
    assert_eq!(ranked, again);
}

// c and d both score 100 points; e scores 120.
fn tied_points_rows() -> Vec<QualifiedPlayer> {
    qualified(&[
        player("c", 60, 0.20, 50, 500.0, 0, 17),
        player("d", 60, 0.22, 40, 600.0, 0, 17),
        player("e", 70, 0.25, 60, 600.0, 0, 17),
    ])
}

#[test]
fn tied_points_share_average_rank() {
    let ranked = rank_players(
        &tied_points_rows(),
        &spec(&[(Metric::FantasyPoints, 1.0)], TieRule::Average),
    )
    .expect("ranked");
    let rank_of = |id: &str| {
        ranked
            .iter()
            .find(|r| r.player.stat.player_id == id)
            .and_then(|r| r.rank_for(Metric::FantasyPoints))
    };
    assert_eq!(rank_of("e"), Some(1.0));
    assert_eq!(rank_of("c"), Some(2.5));
    assert_eq!(rank_of("d"), Some(2.5));
}

#[test]
fn tied_points_share_min_rank() {
    let ranked = rank_players(
        &tied_points_rows(),
        &spec(&[(Metric::FantasyPoints, 1.0)], TieRule::Min),
    )
    .expect("ranked");
    let rank_of = |id: &str| {
        ranked
            .iter()
            .find(|r| r.player.stat.player_id == id)
            .and_then(|r| r.rank_for(Metric::FantasyPoints))
    };
    assert_eq!(rank_of("e"), Some(1.0));
    assert_eq!(rank_of("c"), Some(2.0));
    assert_eq!(rank_of("d"), Some(2.0));
}

#[test]
fn equal_composites_share_final_rank() {
    // x leads on points, y leads on target share; equal weights cancel out.
    let rows = qualified(&[
        player("x", 80, 0.20, 70, 1000.0, 8, 17),
        player("y", 90, 0.28, 60, 800.0, 5, 17),
    ]);
    let metrics = [(Metric::FantasyPoints, 0.5), (Metric::TargetShare, 0.5)];

    let avg = rank_players(&rows, &spec(&metrics, TieRule::Average)).expect("ranked");
    assert!(avg.iter().all(|r| (r.composite_score - 1.5).abs() < 1e-12));
    assert!(avg.iter().all(|r| r.final_rank == 1.5));
    // Ties keep input order.
    assert_eq!(avg[0].player.stat.player_id, "x");

    let min = rank_players(&rows, &spec(&metrics, TieRule::Min)).expect("ranked");
    assert!(min.iter().all(|r| r.final_rank == 1.0));
}

#[test]
fn ranks_are_monotonic_in_every_metric() {
    let rows = qualified(&[
        player("p1", 140, 0.29, 105, 1400.0, 11, 17),
        player("p2", 120, 0.24, 88, 1210.0, 9, 16),
        player("p3", 95, 0.21, 70, 980.0, 6, 12),
        player("p4", 60, 0.13, 41, 610.0, 5, 17),
        player("p5", 44, 0.10, 30, 455.0, 2, 9),
        player("p6", 88, 0.21, 66, 700.0, 3, 17),
    ]);
    let ranked = rank_players(&rows, &RankingSpec::default()).expect("ranked");
    for metric in [Metric::FantasyPoints, Metric::TargetShare, Metric::PointsPerGame] {
        for a in &ranked {
            for b in &ranked {
                let (va, vb) = (a.player.metric(metric), b.player.metric(metric));
                let (ra, rb) = (a.rank_for(metric).unwrap(), b.rank_for(metric).unwrap());
                if va > vb {
                    assert!(ra < rb, "{metric}: {va} > {vb} but rank {ra} >= {rb}");
                } else if va == vb {
                    assert_eq!(ra, rb);
                }
            }
        }
    }
    let finals: Vec<f64> = ranked.iter().map(|r| r.final_rank).collect();
    assert!(finals.windows(2).all(|w| w[0] <= w[1]));
    for r in &ranked {
        let expected: f64 = [
            (Metric::FantasyPoints, 0.4),
            (Metric::TargetShare, 0.3),
            (Metric::PointsPerGame, 0.3),
        ]
        .iter()
        .map(|(m, w)| w * r.rank_for(*m).unwrap())
        .sum();
        assert!((r.composite_score - expected).abs() < 1e-9);
    }
}

#[test]
fn empty_metric_list_is_a_config_error() {
    let rows = tied_points_rows();
    let err = rank_players(&rows, &spec(&[], TieRule::Average)).unwrap_err();
    assert_eq!(err, ConfigError::EmptyMetrics);
}

#[test]
fn non_positive_weight_is_rejected() {
    let rows = tied_points_rows();
    let err = rank_players(&rows, &spec(&[(Metric::TargetShare, -0.3)], TieRule::Min)).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidWeight { .. }));
}

#[test]
fn empty_qualified_set_ranks_to_empty() {
    let ranked = rank_players(&[], &RankingSpec::default()).expect("empty is valid");
    assert!(ranked.is_empty());
}
