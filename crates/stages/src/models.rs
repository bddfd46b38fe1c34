use std::fmt;
use std::str::FromStr;

use enum_map::Enum;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::errors::PowerError;

/// Identifies one stage of one edition. `stage_index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageKey {
    pub year: u16,
    pub stage_index: u32,
}

impl StageKey {
    pub const fn new(year: u16, stage_index: u32) -> Self {
        Self { year, stage_index }
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage {}", self.year, self.stage_index)
    }
}

/// Coarse terrain shape of a stage, as published by the race organiser (`p1`..`p5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileClass {
    Flat,
    HillsFlatFinish,
    HillsUphillFinish,
    MountainsFlatFinish,
    MountainsUphillFinish,
}

impl ProfileClass {
    pub const ALL: [ProfileClass; 5] = [
        ProfileClass::Flat,
        ProfileClass::HillsFlatFinish,
        ProfileClass::HillsUphillFinish,
        ProfileClass::MountainsFlatFinish,
        ProfileClass::MountainsUphillFinish,
    ];

    /// Maps a dataset `profile_icon` code to its class. Unknown codes are rejected.
    pub fn from_icon(code: &str) -> Result<Self, PowerError> {
        match code.trim() {
            "p1" => Ok(ProfileClass::Flat),
            "p2" => Ok(ProfileClass::HillsFlatFinish),
            "p3" => Ok(ProfileClass::HillsUphillFinish),
            "p4" => Ok(ProfileClass::MountainsFlatFinish),
            "p5" => Ok(ProfileClass::MountainsUphillFinish),
            other => Err(PowerError::UnknownProfileClass(other.to_string())),
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ProfileClass::Flat => "p1",
            ProfileClass::HillsFlatFinish => "p2",
            ProfileClass::HillsUphillFinish => "p3",
            ProfileClass::MountainsFlatFinish => "p4",
            ProfileClass::MountainsUphillFinish => "p5",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProfileClass::Flat => "Flat",
            ProfileClass::HillsFlatFinish => "Hills, flat finish",
            ProfileClass::HillsUphillFinish => "Hills, uphill finish",
            ProfileClass::MountainsFlatFinish => "Mountains, flat finish",
            ProfileClass::MountainsUphillFinish => "Mountains, uphill finish",
        }
    }
}

impl FromStr for ProfileClass {
    type Err = PowerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(class) = Self::from_icon(s) {
            return Ok(class);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PowerError::UnknownProfileClass(s.to_string()))
    }
}

impl fmt::Display for ProfileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageType {
    Race,
    TimeTrial,
    Other(String),
}

impl StageType {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "RR" => StageType::Race,
            "ITT" => StageType::TimeTrial,
            other => StageType::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// One timed stage of an edition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub year: u16,
    pub stage_index: u32,
    pub departure: String,
    pub arrival: String,
    pub stage_type: StageType,
    pub distance_km: f64,
    pub vertical_meters: f64,
    pub gc_weight_kg: f64,
    /// GC leader's time on the stage, seconds.
    pub gc_stage_time_s: f64,
    pub gc_speed_m_s: f64,
    /// Mean grade as rise/run.
    pub grade: f64,
    pub departure_coord: Coordinate,
    pub arrival_coord: Coordinate,
    pub departure_elevation_m: f64,
    pub arrival_elevation_m: f64,
    /// Raw `p1`..`p5` code; see [`StageRecord::profile_class`].
    pub profile_icon: String,
    pub winner: Option<String>,
    pub gc_leader: Option<String>,
    #[serde(skip)]
    pub winner_time: Option<Duration>,
}

impl StageRecord {
    pub fn key(&self) -> StageKey {
        StageKey::new(self.year, self.stage_index)
    }

    pub fn profile_class(&self) -> Result<ProfileClass, PowerError> {
        ProfileClass::from_icon(&self.profile_icon)
    }

    pub fn gc_speed_kmh(&self) -> f64 {
        self.gc_speed_m_s * 3.6
    }

    pub fn name(&self) -> String {
        format!("{}-{}", self.departure, self.arrival)
    }
}

/// Edition-level power estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearPower {
    pub year: u16,
    pub stage_count: usize,
    pub total_climb_m: f64,
    pub total_distance_km: f64,
    pub mean_weight_kg: f64,
    pub total_time_s: f64,
    pub mean_grade: f64,
    pub mean_velocity_m_s: f64,
    pub power_w: f64,
}

/// Where a measured track came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackSource {
    MeasuredGps,
    MeasuredPowerTrace { rider: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Cumulative distance from the start, km.
    pub distance_km: f64,
    pub elevation_m: f64,
    pub lat: f64,
    pub lon: f64,
    /// Instantaneous power, only present on power traces.
    pub power_w: Option<f64>,
}

/// A measured track, passed through untouched by profile selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealTrack {
    pub source: TrackSource,
    pub points: Vec<TrackPoint>,
}

impl RealTrack {
    pub fn new(source: TrackSource, points: Vec<TrackPoint>) -> Self {
        Self { source, points }
    }

    pub fn total_distance_km(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.distance_km)
    }

    pub fn has_power(&self) -> bool {
        self.points.iter().any(|p| p.power_w.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub distance_km: f64,
    pub elevation_m: f64,
}

/// Ordered (distance, elevation) points of a synthesized stage profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileCurve {
    pub points: Vec<CurvePoint>,
}

impl ProfileCurve {
    pub fn from_xy(xs: &[f64], ys: &[f64]) -> Self {
        let points = xs
            .iter()
            .zip(ys)
            .map(|(&distance_km, &elevation_m)| CurvePoint {
                distance_km,
                elevation_m,
            })
            .collect();
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.distance_km)
    }

    pub fn max_elevation_m(&self) -> Option<f64> {
        self.points.iter().map(|p| p.elevation_m).reduce(f64::max)
    }
}
