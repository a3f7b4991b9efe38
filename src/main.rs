use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use wr_leaderboard::config::{self, LeaderboardConfig};
use wr_leaderboard::import::TableSource;
use wr_leaderboard::stats::{Metric, PlayerSeasonStat};
use wr_leaderboard::summary::{CORRELATION_METRICS, correlation_matrix, target_share_trend};
use wr_leaderboard::{export, import, leaderboard, logging, pipeline, report, store};

fn main() -> Result<()> {
    logging::init_logging("info")?;

    let mut config = LeaderboardConfig::from_env()?;
    apply_args(&mut config)?;
    config.validate()?;

    let source = TableSource::from_paths(parse_path_arg("--totals"), parse_path_arg("--roster"))?;
    let table = match source {
        TableSource::Files { totals, roster } => {
            import::load_season_files(&totals, &roster, config.season, &config.position)?
        }
        TableSource::Store => load_from_store(&config)?,
    };

    let board = pipeline::run(&table, &config)?;
    if board.is_empty() {
        println!(
            "No {} met the {}-target threshold in {}",
            config.position, config.min_targets, config.season
        );
    }

    let mut sizes = config.leaderboard_sizes.clone();
    sizes.sort_unstable();
    sizes.dedup();
    if let Some(&first) = sizes.first() {
        let title = format!(
            "Top {first} {}s for PPR Leagues ({})",
            config.position, config.season
        );
        println!("{}", report::leaderboard_table(&title, board.top(first)));

        let top = board.top(first);
        let by_points = leaderboard::top_by(top, Metric::FantasyPoints, 10);
        let by_ppg = leaderboard::top_by(top, Metric::PointsPerGame, 10);
        println!("Top 10 by total PPR points:");
        for r in by_points {
            println!("  {:<24} {:>7.1}", r.name(), r.player.fantasy_points);
        }
        println!("Top 10 by points per game:");
        for r in by_ppg {
            println!("  {:<24} {:>7.1}", r.name(), r.player.points_per_game);
        }
        println!();
    }

    let corr = correlation_matrix(&board.qualified, &CORRELATION_METRICS);
    println!("{}", report::correlation_table(&corr));
    if let Some(fit) = target_share_trend(&board.qualified) {
        println!(
            "Trend: PPR points = {:.1} * target share + {:.1}\n",
            fit.slope, fit.intercept
        );
    }

    let points_top = config.max_size();
    let points = leaderboard::points_leaderboard(&board.qualified, points_top);
    let title = format!(
        "Top {points_top} {}s Based on PPR Points ({} Season)",
        config.position, config.season
    );
    println!("{}", report::points_table(&title, &points));

    if let Some(path) = parse_path_arg("--xlsx") {
        let first = sizes.first().copied().unwrap_or(points_top);
        let summary = export::write_workbook(&path, &board, first, points_top)?;
        info!(
            path = %path.display(),
            rows = summary.leaderboard_rows,
            points_rows = summary.points_rows,
            "workbook written"
        );
    }
    if let Some(path) = parse_path_arg("--json") {
        export::write_json(&path, &board)?;
        info!(path = %path.display(), "json written");
    }

    Ok(())
}

fn load_from_store(config: &LeaderboardConfig) -> Result<Vec<PlayerSeasonStat>> {
    let db_path = config
        .db_path
        .clone()
        .or_else(store::default_db_path)
        .context("unable to resolve sqlite path")?;
    let conn = store::open_db(&db_path)?;
    store::load_season(&conn, config.season, &config.position)
}

fn apply_args(cfg: &mut LeaderboardConfig) -> Result<()> {
    if let Some(raw) = parse_str_arg("--season") {
        cfg.season = config::parse_num("--season", &raw)?;
    }
    if let Some(raw) = parse_str_arg("--position") {
        cfg.position = raw.to_ascii_uppercase();
    }
    if let Some(raw) = parse_str_arg("--min-targets") {
        cfg.min_targets = config::parse_num("--min-targets", &raw)?;
    }
    if let Some(raw) = parse_str_arg("--scoring") {
        cfg.scoring = config::parse_scoring(&raw)?;
    }
    if let Some(raw) = parse_str_arg("--metrics") {
        cfg.metrics = config::parse_metrics(&raw)?;
    }
    if let Some(raw) = parse_str_arg("--tie-rule") {
        cfg.tie_rule = config::parse_tie_rule(&raw)?;
    }
    if let Some(raw) = parse_str_arg("--top") {
        cfg.leaderboard_sizes = config::parse_sizes(&raw)?;
    }
    if let Some(path) = parse_path_arg("--db") {
        cfg.db_path = Some(path);
    }
    Ok(())
}

fn parse_str_arg(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&prefix)
            && !v.trim().is_empty()
        {
            return Some(v.trim().to_string());
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn parse_path_arg(flag: &str) -> Option<PathBuf> {
    parse_str_arg(flag).map(PathBuf::from)
}
