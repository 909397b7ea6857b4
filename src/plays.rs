use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::{Field, Row};
use parquet::schema::types::Type;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::http_cache::{app_cache_dir, fetch_file_cached};
use crate::http_client::download_client;

pub const DEFAULT_PBP_URL_TEMPLATE: &str =
    "https://github.com/nflverse/nflverse-data/releases/download/pbp/play_by_play_{year}.parquet";

const PBP_COLUMNS: [&str; 10] = [
    "passer_player_name",
    "receiver_player_name",
    "rusher_player_name",
    "passer_player_id",
    "receiver_player_id",
    "rusher_player_id",
    "yards_gained",
    "rush_touchdown",
    "pass_touchdown",
    "week",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchdownCategory {
    Rushing,
    Receiving,
    Passing,
}

impl TouchdownCategory {
    pub const ALL: [TouchdownCategory; 3] = [
        TouchdownCategory::Rushing,
        TouchdownCategory::Receiving,
        TouchdownCategory::Passing,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TouchdownCategory::Rushing => "rushing",
            TouchdownCategory::Receiving => "receiving",
            TouchdownCategory::Passing => "passing",
        }
    }
}

/// Subset of an nflverse play-by-play row; rows without a week never get this far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayRecord {
    pub passer_player_name: Option<String>,
    pub receiver_player_name: Option<String>,
    pub rusher_player_name: Option<String>,
    pub passer_player_id: Option<String>,
    pub receiver_player_id: Option<String>,
    pub rusher_player_id: Option<String>,
    pub yards_gained: f64,
    pub rush_touchdown: bool,
    pub pass_touchdown: bool,
    pub week: u32,
}

impl PlayRecord {
    pub fn is_touchdown(&self, category: TouchdownCategory) -> bool {
        match category {
            TouchdownCategory::Rushing => self.rush_touchdown,
            // Receiver and passer are credited on the same play.
            TouchdownCategory::Receiving | TouchdownCategory::Passing => self.pass_touchdown,
        }
    }

    fn credited(&self, category: TouchdownCategory) -> (Option<&str>, Option<&str>) {
        let (name, id) = match category {
            TouchdownCategory::Rushing => (&self.rusher_player_name, &self.rusher_player_id),
            TouchdownCategory::Receiving => (&self.receiver_player_name, &self.receiver_player_id),
            TouchdownCategory::Passing => (&self.passer_player_name, &self.passer_player_id),
        };
        (name.as_deref(), id.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchdownPlay {
    pub player_display_name: String,
    pub player_id: Option<String>,
    pub yards: u32,
    pub week: u32,
    pub category: TouchdownCategory,
}

/// Touchdowns of one category, longest first.
pub fn touchdowns(records: &[PlayRecord], category: TouchdownCategory) -> Vec<TouchdownPlay> {
    let mut out: Vec<TouchdownPlay> = records
        .iter()
        .filter(|r| r.is_touchdown(category))
        .filter_map(|r| {
            let (name, id) = r.credited(category);
            let name = name.map(str::trim).filter(|n| !n.is_empty())?;
            Some(TouchdownPlay {
                player_display_name: name.to_string(),
                player_id: id.map(|s| s.to_string()),
                yards: yards_from_raw(r.yards_gained),
                week: r.week,
                category,
            })
        })
        .collect();
    sort_by_yards(&mut out);
    out
}

pub fn touchdown_count(records: &[PlayRecord], category: TouchdownCategory) -> usize {
    records.iter().filter(|r| r.is_touchdown(category)).count()
}

/// Yards descending; equal yardage falls back to week ascending, then player name.
pub fn sort_by_yards(plays: &mut [TouchdownPlay]) {
    plays.sort_by(compare_rank);
}

pub fn compare_rank(a: &TouchdownPlay, b: &TouchdownPlay) -> Ordering {
    b.yards
        .cmp(&a.yards)
        .then(a.week.cmp(&b.week))
        .then_with(|| a.player_display_name.cmp(&b.player_display_name))
}

fn yards_from_raw(raw: f64) -> u32 {
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    raw.trunc().min(u32::MAX as f64) as u32
}

pub trait PlaySource: Send + Sync {
    fn load_season(&self, year: u16) -> Result<Vec<PlayRecord>>;
}

/// Season play-by-play from the nflverse release parquet files.
#[derive(Debug, Clone)]
pub struct NflversePlaySource {
    url_template: String,
    cache_dir: PathBuf,
}

impl NflversePlaySource {
    pub fn new(url_template: impl Into<String>) -> Self {
        let cache_dir = app_cache_dir().unwrap_or_else(|| std::env::temp_dir().join("longest_tds"));
        Self {
            url_template: url_template.into(),
            cache_dir,
        }
    }

    pub fn season_url(&self, year: u16) -> String {
        self.url_template.replace("{year}", &year.to_string())
    }
}

impl PlaySource for NflversePlaySource {
    fn load_season(&self, year: u16) -> Result<Vec<PlayRecord>> {
        let url = self.season_url(year);
        let target = self.cache_dir.join(format!("play_by_play_{year}.parquet"));
        let client = download_client()?;
        let path = fetch_file_cached(client, &url, &target)
            .with_context(|| format!("fetch play-by-play for {year}"))?;
        let records = read_play_records(&path)?;
        info!(year, plays = records.len(), "loaded play-by-play");
        Ok(records)
    }
}

pub fn read_play_records(path: &Path) -> Result<Vec<PlayRecord>> {
    let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = SerializedFileReader::new(file).context("open parquet reader plays")?;

    let schema = reader.metadata().file_metadata().schema();
    let fields: Vec<_> = schema
        .get_fields()
        .iter()
        .filter(|f| PBP_COLUMNS.contains(&f.name()))
        .cloned()
        .collect();
    for wanted in ["yards_gained", "week"] {
        if !fields.iter().any(|f| f.name() == wanted) {
            return Err(anyhow!("play-by-play file missing column {wanted}"));
        }
    }
    let projection = Type::group_type_builder(schema.name())
        .with_fields(fields)
        .build()
        .context("build parquet projection")?;

    let iter = reader
        .get_row_iter(Some(projection))
        .context("iterate play rows")?;
    let mut out = Vec::new();
    for row in iter {
        let row = row.context("read play row")?;
        if let Some(record) = record_from_row(&row) {
            out.push(record);
        }
    }
    Ok(out)
}

fn record_from_row(row: &Row) -> Option<PlayRecord> {
    let mut record = PlayRecord::default();
    let mut week = None;
    for (name, field) in row.get_column_iter() {
        match name.as_str() {
            "passer_player_name" => record.passer_player_name = field_string(field),
            "receiver_player_name" => record.receiver_player_name = field_string(field),
            "rusher_player_name" => record.rusher_player_name = field_string(field),
            "passer_player_id" => record.passer_player_id = field_string(field),
            "receiver_player_id" => record.receiver_player_id = field_string(field),
            "rusher_player_id" => record.rusher_player_id = field_string(field),
            "yards_gained" => record.yards_gained = field_number(field).unwrap_or(0.0),
            "rush_touchdown" => record.rush_touchdown = field_flag(field),
            "pass_touchdown" => record.pass_touchdown = field_flag(field),
            "week" => week = field_number(field),
            _ => {}
        }
    }
    record.week = week_from_raw(week?)?;
    Some(record)
}

pub fn week_from_raw(raw: f64) -> Option<u32> {
    if !raw.is_finite() || raw < 1.0 {
        return None;
    }
    Some(raw.trunc() as u32)
}

fn field_string(field: &Field) -> Option<String> {
    match field {
        Field::Str(s) => Some(s.clone()),
        Field::Int(v) => Some(v.to_string()),
        Field::Long(v) => Some(v.to_string()),
        _ => None,
    }
}

fn field_number(field: &Field) -> Option<f64> {
    match field {
        Field::Double(v) => Some(*v),
        Field::Float(v) => Some(*v as f64),
        Field::Long(v) => Some(*v as f64),
        Field::Int(v) => Some(*v as f64),
        Field::Short(v) => Some(*v as f64),
        Field::Byte(v) => Some(*v as f64),
        Field::Str(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn field_flag(field: &Field) -> bool {
    match field {
        Field::Bool(b) => *b,
        other => field_number(other).is_some_and(|v| v == 1.0),
    }
}
