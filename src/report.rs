use std::fmt::Write as _;

use crate::leaderboard::PointsRow;
use crate::stats::RankedPlayer;
use crate::summary::CorrelationMatrix;

const NAME_WIDTH: usize = 24;

pub fn leaderboard_table(title: &str, rows: &[RankedPlayer]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(104));
    let _ = writeln!(
        out,
        "{:>5}  {:<w$} {:>5} {:>7} {:>8} {:>5} {:>7} {:>4} {:>8} {:>6} {:>9}",
        "Rank", "Player", "Games", "Targets", "TgtShare", "Rec", "Yards", "TDs", "PPR", "PPG", "Composite",
        w = NAME_WIDTH
    );
    for r in rows {
        let p = &r.player;
        let _ = writeln!(
            out,
            "{:>5.1}  {:<w$} {:>5} {:>7} {:>8.2} {:>5} {:>7.0} {:>4} {:>8.2} {:>6.2} {:>9.2}",
            r.final_rank,
            truncate(&p.stat.player_name, NAME_WIDTH),
            p.stat.games,
            p.stat.targets,
            p.stat.target_share,
            p.stat.receptions,
            p.stat.receiving_yards,
            p.stat.receiving_tds,
            p.fantasy_points,
            p.points_per_game,
            r.composite_score,
            w = NAME_WIDTH
        );
    }
    out
}

pub fn points_table(title: &str, rows: &[PointsRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "=".repeat(90));
    let _ = writeln!(
        out,
        "{:<w$} {:>5} {:>7} {:>10} {:>7} {:>4} {:>10} {:>6} {:>5}",
        "Player", "Games", "Targets", "Receptions", "Yards", "TDs", "PPR Points", "PPG", "Rank",
        w = NAME_WIDTH
    );
    for r in rows {
        let p = &r.player;
        let _ = writeln!(
            out,
            "{:<w$} {:>5} {:>7} {:>10} {:>7.0} {:>4} {:>10.2} {:>6.2} {:>5}",
            truncate(&p.stat.player_name, NAME_WIDTH),
            p.stat.games,
            p.stat.targets,
            p.stat.receptions,
            p.stat.receiving_yards,
            p.stat.receiving_tds,
            p.fantasy_points,
            p.points_per_game,
            r.rank,
            w = NAME_WIDTH
        );
    }
    out
}

pub fn correlation_table(matrix: &CorrelationMatrix) -> String {
    let mut out = String::from("Correlation Matrix:\n");
    let _ = write!(out, "{:<14}", "");
    for m in &matrix.metrics {
        let _ = write!(out, "{:>14}", m.label());
    }
    out.push('\n');
    for (m, values) in matrix.metrics.iter().zip(&matrix.values) {
        let _ = write!(out, "{:<14}", m.label());
        for v in values {
            match v {
                Some(v) => {
                    let _ = write!(out, "{v:>14.2}");
                }
                None => {
                    let _ = write!(out, "{:>14}", "n/a");
                }
            }
        }
        out.push('\n');
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}
