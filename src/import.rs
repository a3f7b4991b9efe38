use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::{Field, Row};
use tracing::info;

use crate::error::{ConfigError, LeaderboardError};
use crate::roster::{REGULAR_SEASON, RosterEntry, SeasonalTotals, join_roster};
use crate::stats::PlayerSeasonStat;

/// Where the season table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    Files { totals: PathBuf, roster: PathBuf },
    Store,
}

impl TableSource {
    /// Both files or neither; one without the other is an error.
    pub fn from_paths(totals: Option<PathBuf>, roster: Option<PathBuf>) -> Result<Self> {
        match (totals, roster) {
            (Some(totals), Some(roster)) => Ok(TableSource::Files { totals, roster }),
            (None, None) => Ok(TableSource::Store),
            _ => bail!("--totals and --roster must be given together"),
        }
    }
}

/// The joined, position-filtered table for one season read straight from files.
///
/// No totals for `season` fails with `ConfigError::UnknownSeason`.
pub fn load_season_files(
    totals_path: &Path,
    roster_path: &Path,
    season: u16,
    position: &str,
) -> Result<Vec<PlayerSeasonStat>> {
    let roster = load_roster(roster_path)?;
    let totals: Vec<SeasonalTotals> = load_totals(totals_path)?
        .into_iter()
        .filter(|t| t.season == season)
        .collect();
    if totals.is_empty() {
        return Err(LeaderboardError::from(ConfigError::UnknownSeason(season)).into());
    }
    let rows = join_roster(&totals, &roster, position).map_err(LeaderboardError::from)?;
    info!(season, position, rows = rows.len(), "season table loaded from files");
    Ok(rows)
}

/// Load totals from `.parquet` or JSON, chosen by extension.
pub fn load_totals(path: &Path) -> Result<Vec<SeasonalTotals>> {
    if is_parquet(path) {
        load_totals_parquet(path)
    } else {
        load_totals_json(path)
    }
}

pub fn load_roster(path: &Path) -> Result<Vec<RosterEntry>> {
    if is_parquet(path) {
        load_roster_parquet(path)
    } else {
        load_roster_json(path)
    }
}

fn is_parquet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"))
}

pub fn load_totals_json(path: &Path) -> Result<Vec<SeasonalTotals>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_totals_json(&raw).with_context(|| format!("parse totals {}", path.display()))
}

pub fn load_roster_json(path: &Path) -> Result<Vec<RosterEntry>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_roster_json(&raw).with_context(|| format!("parse roster {}", path.display()))
}

/// A JSON array of totals records. `null` is an empty table.
pub fn parse_totals_json(raw: &str) -> Result<Vec<SeasonalTotals>> {
    let rows: Option<Vec<SeasonalTotals>> = serde_json::from_str(raw)?;
    Ok(rows.unwrap_or_default())
}

pub fn parse_roster_json(raw: &str) -> Result<Vec<RosterEntry>> {
    let rows: Option<Vec<RosterEntry>> = serde_json::from_str(raw)?;
    Ok(rows.unwrap_or_default())
}

/// Seasonal totals from an nflverse-style parquet file, columns matched by name.
pub fn load_totals_parquet(path: &Path) -> Result<Vec<SeasonalTotals>> {
    let mut out = Vec::new();
    for_each_row(path, |row| {
        let cols = columns(row);
        let player_id = read_str(&cols, "player_id").ok_or_else(|| anyhow!("row without player_id"))?;
        let season = read_num(&cols, "season").ok_or_else(|| anyhow!("{player_id}: row without season"))?;
        let season = to_season(season).with_context(|| format!("{player_id}: bad season"))?;
        out.push(SeasonalTotals {
            player_id,
            season,
            season_type: read_str(&cols, "season_type").unwrap_or_else(|| REGULAR_SEASON.to_string()),
            games: read_count(&cols, "games"),
            targets: read_count(&cols, "targets"),
            target_share: read_num(&cols, "target_share"),
            receptions: read_count(&cols, "receptions"),
            receiving_yards: read_num(&cols, "receiving_yards"),
            receiving_tds: read_count(&cols, "receiving_tds"),
        });
        Ok(())
    })?;
    Ok(out)
}

pub fn load_roster_parquet(path: &Path) -> Result<Vec<RosterEntry>> {
    let mut out = Vec::new();
    for_each_row(path, |row| {
        let cols = columns(row);
        let (Some(player_id), Some(season)) = (read_str(&cols, "player_id"), read_num(&cols, "season"))
        else {
            // Rosters carry staff and practice-squad rows without ids.
            return Ok(());
        };
        let season = to_season(season).with_context(|| format!("{player_id}: bad season"))?;
        out.push(RosterEntry {
            player_id,
            player_name: read_str(&cols, "player_name").unwrap_or_default(),
            position: read_str(&cols, "position").unwrap_or_default(),
            season,
        });
        Ok(())
    })?;
    Ok(out)
}

fn for_each_row(path: &Path, mut f: impl FnMut(&Row) -> Result<()>) -> Result<()> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = SerializedFileReader::new(file)
        .with_context(|| format!("open parquet reader {}", path.display()))?;
    let iter = reader
        .get_row_iter(None)
        .with_context(|| format!("iterate rows {}", path.display()))?;
    for row in iter {
        let row = row.with_context(|| format!("decode row in {}", path.display()))?;
        f(&row)?;
    }
    Ok(())
}

fn columns(row: &Row) -> HashMap<&str, &Field> {
    row.get_column_iter()
        .map(|(name, field)| (name.as_str(), field))
        .collect()
}

fn read_str(cols: &HashMap<&str, &Field>, name: &str) -> Option<String> {
    match cols.get(name)? {
        Field::Str(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn read_num(cols: &HashMap<&str, &Field>, name: &str) -> Option<f64> {
    let v = match cols.get(name)? {
        Field::Double(v) => *v,
        Field::Float(v) => *v as f64,
        Field::Long(v) => *v as f64,
        Field::Int(v) => *v as f64,
        Field::Short(v) => *v as f64,
        Field::Byte(v) => *v as f64,
        Field::UInt(v) => *v as f64,
        Field::ULong(v) => *v as f64,
        _ => return None,
    };
    (!v.is_nan()).then_some(v)
}

fn to_season(v: f64) -> Result<u16> {
    if v.fract() != 0.0 {
        bail!("season {v} is not a whole year");
    }
    u16::try_from(v as i64).with_context(|| format!("season {v} out of range"))
}

/// Counts are sometimes stored as doubles upstream.
fn read_count(cols: &HashMap<&str, &Field>, name: &str) -> Option<u32> {
    let v = read_num(cols, name)?;
    (v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64).then_some(v as u32)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parquet::data_type::{ByteArray, ByteArrayType, DoubleType, Int64Type};
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;

    use super::*;

    const TOTALS_SCHEMA: &str = "
        message totals {
            OPTIONAL BYTE_ARRAY player_id (UTF8);
            OPTIONAL INT64 season;
            OPTIONAL BYTE_ARRAY season_type (UTF8);
            OPTIONAL DOUBLE games;
            OPTIONAL INT64 targets;
            OPTIONAL DOUBLE target_share;
            OPTIONAL DOUBLE receptions;
            OPTIONAL DOUBLE receiving_yards;
            OPTIONAL INT64 receiving_tds;
        }";

    const ROSTER_SCHEMA: &str = "
        message roster {
            OPTIONAL BYTE_ARRAY player_id (UTF8);
            OPTIONAL INT64 season;
            OPTIONAL BYTE_ARRAY player_name (UTF8);
            OPTIONAL BYTE_ARRAY position (UTF8);
        }";

    enum Col {
        Str(Vec<Option<&'static str>>),
        Long(Vec<Option<i64>>),
        Double(Vec<Option<f64>>),
    }

    fn def_levels<T>(values: &[Option<T>]) -> Vec<i16> {
        values.iter().map(|v| i16::from(v.is_some())).collect()
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "wr_leaderboard_{}_{name}.parquet",
            std::process::id()
        ))
    }

    fn write_parquet(path: &Path, schema: &str, cols: Vec<Col>) {
        let schema = Arc::new(parse_message_type(schema).expect("schema"));
        let props = Arc::new(WriterProperties::builder().build());
        let file = fs::File::create(path).expect("create parquet file");
        let mut writer = SerializedFileWriter::new(file, schema, props).expect("writer");
        let mut group = writer.next_row_group().expect("row group");
        for col in cols {
            let mut column = group.next_column().expect("next column").expect("column");
            match col {
                Col::Str(values) => {
                    let defs = def_levels(&values);
                    let data: Vec<ByteArray> = values.into_iter().flatten().map(ByteArray::from).collect();
                    column
                        .typed::<ByteArrayType>()
                        .write_batch(&data, Some(&defs), None)
                        .expect("write str column");
                }
                Col::Long(values) => {
                    let defs = def_levels(&values);
                    let data: Vec<i64> = values.into_iter().flatten().collect();
                    column
                        .typed::<Int64Type>()
                        .write_batch(&data, Some(&defs), None)
                        .expect("write long column");
                }
                Col::Double(values) => {
                    let defs = def_levels(&values);
                    let data: Vec<f64> = values.into_iter().flatten().collect();
                    column
                        .typed::<DoubleType>()
                        .write_batch(&data, Some(&defs), None)
                        .expect("write double column");
                }
            }
            column.close().expect("close column");
        }
        group.close().expect("close row group");
        writer.close().expect("close writer");
    }

    fn totals_file(name: &str, seasons: Vec<Option<i64>>) -> PathBuf {
        let path = temp_path(name);
        write_parquet(
            &path,
            TOTALS_SCHEMA,
            vec![
                Col::Str(vec![Some("00-1"), Some("00-2")]),
                Col::Long(seasons),
                Col::Str(vec![Some("REG"), None]),
                Col::Double(vec![Some(17.0), Some(16.5)]),
                Col::Long(vec![Some(120), Some(50)]),
                Col::Double(vec![Some(0.25), None]),
                Col::Double(vec![Some(80.0), Some(-1.0)]),
                Col::Double(vec![Some(1100.0), Some(400.0)]),
                Col::Long(vec![Some(8), None]),
            ],
        );
        path
    }

    #[test]
    fn totals_json_accepts_nulls_and_default_season_type() {
        let raw = r#"[{"player_id":"00-1","season":2024,"games":17,"targets":null,
            "target_share":0.2,"receptions":70,"receiving_yards":880.0,"receiving_tds":5}]"#;
        let rows = parse_totals_json(raw).expect("parse");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].season_type, "REG");
        assert_eq!(rows[0].targets, None);
    }

    #[test]
    fn null_documents_are_empty() {
        assert!(parse_totals_json("null").expect("null").is_empty());
        assert!(parse_roster_json("null").expect("null").is_empty());
    }

    #[test]
    fn counts_accept_whole_doubles_only() {
        let whole = Field::Double(2.0);
        let half = Field::Double(2.5);
        let negative = Field::Double(-1.0);
        let long = Field::Long(7);
        let name = Field::Str("x".to_string());
        let cols: HashMap<&str, &Field> = HashMap::from([
            ("whole", &whole),
            ("half", &half),
            ("negative", &negative),
            ("long", &long),
            ("name", &name),
        ]);
        assert_eq!(read_count(&cols, "whole"), Some(2));
        assert_eq!(read_count(&cols, "half"), None);
        assert_eq!(read_count(&cols, "negative"), None);
        assert_eq!(read_count(&cols, "long"), Some(7));
        assert_eq!(read_count(&cols, "name"), None);
        assert_eq!(read_count(&cols, "absent"), None);
    }

    #[test]
    fn seasons_must_be_whole_years_in_range() {
        assert_eq!(to_season(2024.0).expect("season"), 2024);
        assert!(to_season(2024.5).is_err());
        assert!(to_season(-1.0).is_err());
        assert!(to_season(70_000.0).is_err());
    }

    #[test]
    fn parquet_totals_read_by_column_name() {
        let path = totals_file("totals", vec![Some(2024), Some(2024)]);
        let rows = load_totals(&path).expect("load parquet totals");
        fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 2);
        let a = &rows[0];
        assert_eq!(a.player_id, "00-1");
        assert_eq!(a.season, 2024);
        assert_eq!(a.season_type, "REG");
        assert_eq!(a.games, Some(17));
        assert_eq!(a.targets, Some(120));
        assert_eq!(a.target_share, Some(0.25));
        assert_eq!(a.receptions, Some(80));
        assert_eq!(a.receiving_yards, Some(1100.0));
        assert_eq!(a.receiving_tds, Some(8));

        let b = &rows[1];
        assert_eq!(b.season_type, REGULAR_SEASON);
        assert_eq!(b.games, None);
        assert_eq!(b.target_share, None);
        assert_eq!(b.receptions, None);
        assert_eq!(b.receiving_tds, None);
    }

    #[test]
    fn parquet_totals_reject_out_of_range_season() {
        let path = totals_file("bad_season", vec![Some(2024), Some(70_000)]);
        let result = load_totals_parquet(&path);
        fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn parquet_totals_require_player_id() {
        let path = temp_path("no_id");
        write_parquet(
            &path,
            TOTALS_SCHEMA,
            vec![
                Col::Str(vec![None]),
                Col::Long(vec![Some(2024)]),
                Col::Str(vec![Some("REG")]),
                Col::Double(vec![Some(17.0)]),
                Col::Long(vec![Some(10)]),
                Col::Double(vec![Some(0.1)]),
                Col::Double(vec![Some(8.0)]),
                Col::Double(vec![Some(90.0)]),
                Col::Long(vec![Some(1)]),
            ],
        );
        let result = load_totals_parquet(&path);
        fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn parquet_roster_skips_rows_without_ids() {
        let path = temp_path("roster");
        write_parquet(
            &path,
            ROSTER_SCHEMA,
            vec![
                Col::Str(vec![Some("00-1"), None, Some("00-2")]),
                Col::Long(vec![Some(2024), Some(2024), Some(2023)]),
                Col::Str(vec![Some("A Receiver"), Some("Staff"), Some("B Receiver")]),
                Col::Str(vec![Some("WR"), None, Some("WR")]),
            ],
        );
        let rows = load_roster(&path).expect("load parquet roster");
        fs::remove_file(&path).ok();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player_id, "00-1");
        assert_eq!(rows[0].player_name, "A Receiver");
        assert_eq!(rows[1].season, 2023);
    }

    #[test]
    fn file_source_needs_both_paths() {
        assert_eq!(
            TableSource::from_paths(None, None).expect("store"),
            TableSource::Store
        );
        assert!(TableSource::from_paths(Some(PathBuf::from("t.json")), None).is_err());
        assert!(TableSource::from_paths(None, Some(PathBuf::from("r.json"))).is_err());
        assert!(matches!(
            TableSource::from_paths(Some(PathBuf::from("t.json")), Some(PathBuf::from("r.json"))),
            Ok(TableSource::Files { .. })
        ));
    }
}
