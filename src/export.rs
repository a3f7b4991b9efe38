use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::leaderboard::{self, PointsRow};
use crate::pipeline::Leaderboard;
use crate::stats::{Metric, RankedPlayer};
use crate::summary::{CORRELATION_METRICS, correlation_matrix};

pub struct ExportReport {
    pub leaderboard_rows: usize,
    pub composite_rows: usize,
    pub points_rows: usize,
}

/// Write the leaderboard workbook: the top `top` rows, the composite
/// breakdown, the top `points_top` by raw points, correlations and run info.
pub fn write_workbook(
    path: &Path,
    board: &Leaderboard,
    top: usize,
    points_top: usize,
) -> Result<ExportReport> {
    let top_rows = board.top(top);

    let mut leaderboard_rows = vec![leaderboard_header()];
    leaderboard_rows.extend(top_rows.iter().map(leaderboard_row));

    let mut composite_rows = vec![composite_header(board)];
    composite_rows.extend(
        leaderboard::by_composite(top_rows)
            .into_iter()
            .map(|r| composite_row(board, r)),
    );

    let points = leaderboard::points_leaderboard(&board.qualified, points_top);
    let mut points_rows = vec![points_header()];
    points_rows.extend(points.iter().map(points_row));

    let corr = correlation_matrix(&board.qualified, &CORRELATION_METRICS);
    let mut corr_rows = vec![
        std::iter::once(String::new())
            .chain(corr.metrics.iter().map(|m| m.label().to_string()))
            .collect::<Vec<_>>(),
    ];
    for (metric, values) in corr.metrics.iter().zip(&corr.values) {
        let mut row = vec![metric.label().to_string()];
        row.extend(values.iter().map(|v| opt_fmt(*v)));
        corr_rows.push(row);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Leaderboard")?;
        write_rows(sheet, &leaderboard_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Composite")?;
        write_rows(sheet, &composite_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("PointsTop")?;
        write_rows(sheet, &points_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Correlation")?;
        write_rows(sheet, &corr_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Run")?;
        write_rows(sheet, &run_rows(board))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        leaderboard_rows: leaderboard_rows.len().saturating_sub(1),
        composite_rows: composite_rows.len().saturating_sub(1),
        points_rows: points_rows.len().saturating_sub(1),
    })
}

pub fn write_json(path: &Path, board: &Leaderboard) -> Result<()> {
    let json = serde_json::to_string_pretty(board).context("serialize leaderboard")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

fn leaderboard_header() -> Vec<String> {
    [
        "Player",
        "Games",
        "Targets",
        "Target Share",
        "Receptions",
        "Yards",
        "TDs",
        "PPR Points",
        "PPG",
        "Rank",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn leaderboard_row(r: &RankedPlayer) -> Vec<String> {
    let p = &r.player;
    vec![
        p.stat.player_name.clone(),
        p.stat.games.to_string(),
        p.stat.targets.to_string(),
        fmt2(p.stat.target_share),
        p.stat.receptions.to_string(),
        fmt2(p.stat.receiving_yards),
        p.stat.receiving_tds.to_string(),
        fmt2(p.fantasy_points),
        fmt2(p.points_per_game),
        fmt2(r.final_rank),
    ]
}

fn composite_header(board: &Leaderboard) -> Vec<String> {
    let mut row = vec!["Player".to_string()];
    for mw in &board.ranking.metrics {
        row.push(format!("{} Rank (x{})", mw.metric.label(), mw.weight));
    }
    row.push("Composite Score".to_string());
    row.push("Final Rank".to_string());
    row
}

fn composite_row(board: &Leaderboard, r: &RankedPlayer) -> Vec<String> {
    let mut row = vec![r.name().to_string()];
    for mw in &board.ranking.metrics {
        row.push(opt_fmt(r.rank_for(mw.metric)));
    }
    row.push(fmt2(r.composite_score));
    row.push(fmt2(r.final_rank));
    row
}

fn points_header() -> Vec<String> {
    [
        "Player",
        "Games",
        "Targets",
        "Receptions",
        "Yards",
        "TDs",
        "PPR Points",
        "PPG",
        "Rank",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn points_row(r: &PointsRow) -> Vec<String> {
    let p = &r.player;
    vec![
        p.stat.player_name.clone(),
        p.stat.games.to_string(),
        p.stat.targets.to_string(),
        p.stat.receptions.to_string(),
        fmt2(p.stat.receiving_yards),
        p.stat.receiving_tds.to_string(),
        fmt2(p.metric(Metric::FantasyPoints)),
        fmt2(p.points_per_game),
        r.rank.to_string(),
    ]
}

fn run_rows(board: &Leaderboard) -> Vec<Vec<String>> {
    let metrics = board
        .ranking
        .metrics
        .iter()
        .map(|mw| format!("{}:{}", mw.metric, mw.weight))
        .collect::<Vec<_>>()
        .join(", ");
    vec![
        vec!["Key".to_string(), "Value".to_string()],
        vec!["Season".to_string(), board.qualification.season.to_string()],
        vec![
            "Min Targets".to_string(),
            board.qualification.min_targets.to_string(),
        ],
        vec![
            "Scoring".to_string(),
            format!(
                "yard {} / td {} / rec {}",
                board.scoring.per_yard, board.scoring.per_td, board.scoring.per_reception
            ),
        ],
        vec!["Metrics".to_string(), metrics],
        vec!["Tie Rule".to_string(), board.ranking.tie_rule.to_string()],
        vec!["Input Rows".to_string(), board.input_rows.to_string()],
        vec!["Qualified".to_string(), board.qualified.len().to_string()],
        vec!["Generated".to_string(), Utc::now().to_rfc3339()],
    ]
}

fn fmt2(v: f64) -> String {
    format!("{v:.2}")
}

fn opt_fmt(v: Option<f64>) -> String {
    v.map(fmt2).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
