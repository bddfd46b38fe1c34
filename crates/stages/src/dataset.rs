//! Stage dataset loading.
//!
//! Reads the per-stage CSV export into [`StageRecord`]s. Columns not listed in
//! [`CsvRow`] (such as a leading unnamed index column) are ignored.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::{debug, info};

use crate::errors::PowerError;
use crate::models::{Coordinate, StageKey, StageRecord, StageType};

/// Options applied while loading the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Stages dropped before numbering, keyed by their position in the file.
    pub excluded_stages: Vec<StageKey>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            // Neutralised by rider strikes.
            excluded_stages: vec![StageKey::new(1995, 16), StageKey::new(1996, 9)],
        }
    }
}

impl DatasetConfig {
    pub fn keep_all() -> Self {
        Self {
            excluded_stages: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    year: u16,
    #[serde(default)]
    stage_departure: Option<String>,
    #[serde(default)]
    stage_arrival: Option<String>,
    #[serde(default)]
    stage_type: Option<String>,
    #[serde(default)]
    gc_leader: Option<String>,
    #[serde(default)]
    stage_winner: Option<String>,
    stage_distance: f64,
    stage_vertical_meters: f64,
    gc_weight: f64,
    gc_stage_time: f64,
    gc_speed: f64,
    stage_grade: f64,
    stage_departure_lat: f64,
    stage_departure_lon: f64,
    stage_arrival_lat: f64,
    stage_arrival_lon: f64,
    stage_departure_elevs: f64,
    stage_arrival_elevs: f64,
    profile_icon: String,
    #[serde(default)]
    stage_winner_time_str: Option<String>,
}

/// Loads all stages from a CSV file.
pub fn load_stages(
    path: impl AsRef<Path>,
    config: &DatasetConfig,
) -> Result<Vec<StageRecord>, PowerError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let stages = read_stages(std::io::BufReader::new(file), config)?;
    info!("Loaded {} stages from {}", stages.len(), path.display());
    Ok(stages)
}

/// Reads stages from any CSV source.
///
/// Stages are numbered per year in file order (1-based). Excluded stages are
/// dropped and the rest of that year is renumbered.
pub fn read_stages(reader: impl Read, config: &DatasetConfig) -> Result<Vec<StageRecord>, PowerError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut positions: HashMap<u16, u32> = HashMap::new();
    let mut next_index: HashMap<u16, u32> = HashMap::new();
    let mut stages = Vec::new();

    for rec in rdr.deserialize() {
        let row: CsvRow = rec?;

        let position = positions.entry(row.year).or_insert(0);
        *position += 1;
        let original = StageKey::new(row.year, *position);
        if config.excluded_stages.contains(&original) {
            debug!("Excluding {original}");
            continue;
        }

        let index = next_index.entry(row.year).or_insert(0);
        *index += 1;
        stages.push(into_record(row, *index)?);
    }

    Ok(stages)
}

fn into_record(row: CsvRow, stage_index: u32) -> Result<StageRecord, PowerError> {
    let winner_time = row
        .stage_winner_time_str
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(parse_stage_time)
        .transpose()?;

    Ok(StageRecord {
        year: row.year,
        stage_index,
        departure: row.stage_departure.unwrap_or_default(),
        arrival: row.stage_arrival.unwrap_or_default(),
        stage_type: StageType::from_code(row.stage_type.as_deref().unwrap_or("RR")),
        distance_km: row.stage_distance,
        vertical_meters: row.stage_vertical_meters,
        gc_weight_kg: row.gc_weight,
        gc_stage_time_s: row.gc_stage_time,
        gc_speed_m_s: row.gc_speed,
        grade: row.stage_grade,
        departure_coord: Coordinate {
            lat: row.stage_departure_lat,
            lon: row.stage_departure_lon,
        },
        arrival_coord: Coordinate {
            lat: row.stage_arrival_lat,
            lon: row.stage_arrival_lon,
        },
        departure_elevation_m: row.stage_departure_elevs,
        arrival_elevation_m: row.stage_arrival_elevs,
        profile_icon: row.profile_icon,
        winner: row.stage_winner,
        gc_leader: row.gc_leader,
        winner_time,
    })
}

/// Parses an `H:MM:SS` stage time.
pub fn parse_stage_time(value: &str) -> Result<Duration, PowerError> {
    let bad = || PowerError::invalid(format!("stage time must be H:MM:SS, got {value:?}"));

    let mut parts = value.trim().split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(bad());
    };
    let hours: i64 = h.parse().map_err(|_| bad())?;
    let minutes: i64 = m.parse().map_err(|_| bad())?;
    let seconds: i64 = s.parse().map_err(|_| bad())?;
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return Err(bad());
    }

    Ok(Duration::seconds(hours * 3600 + minutes * 60 + seconds))
}

/// Stages of one edition, in stage order.
pub fn stages_for_year(stages: &[StageRecord], year: u16) -> Vec<&StageRecord> {
    let mut selected: Vec<&StageRecord> = stages.iter().filter(|s| s.year == year).collect();
    selected.sort_by_key(|s| s.stage_index);
    selected
}
