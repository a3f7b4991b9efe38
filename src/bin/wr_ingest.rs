use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use wr_leaderboard::{import, logging, store};

fn main() -> Result<()> {
    logging::init_logging("info")?;
    dotenvy::dotenv().ok();

    let totals_path = parse_path_arg("--totals").context("missing --totals <file>")?;
    let roster_path = parse_path_arg("--roster").context("missing --roster <file>")?;
    let db_path = parse_path_arg("--db")
        .or_else(|| std::env::var("WR_DB_PATH").ok().map(PathBuf::from))
        .or_else(store::default_db_path)
        .context("unable to resolve sqlite path")?;

    let totals = import::load_totals(&totals_path)?;
    let roster = import::load_roster(&roster_path)?;
    if totals.is_empty() {
        return Err(anyhow!("no seasonal totals in {}", totals_path.display()));
    }

    let mut conn = store::open_db(&db_path)?;
    let totals_upserted = store::upsert_totals(&mut conn, &totals)?;
    let roster_inserted = store::insert_roster(&mut conn, &roster)?;
    let source = format!("{} + {}", totals_path.display(), roster_path.display());
    store::record_ingest_run(&conn, &source, totals_upserted, roster_inserted)?;

    let seasons = store::known_seasons(&conn)?;
    println!("Stats ingest complete");
    println!("DB: {}", db_path.display());
    println!("Totals upserted: {totals_upserted}");
    println!("Roster entries added: {roster_inserted}");
    println!("Seasons on record: {seasons:?}");
    Ok(())
}

fn parse_path_arg(flag: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
