//! Measured track providers.
//!
//! A provider answers "is there a measured track for this stage?". Absence is
//! a normal outcome and is returned as `Ok(None)`; only unreadable or
//! malformed files are errors.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::PowerError;
use crate::file_parsers;
use crate::models::{RealTrack, StageKey, TrackPoint, TrackSource};

/// Source a profile can be drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSource {
    Estimated,
    Gpx,
    Rider(String),
}

pub trait TrackProvider: Send + Sync {
    /// Official route of a stage.
    fn route(&self, key: StageKey) -> Result<Option<RealTrack>, PowerError>;

    /// A rider's recorded power trace for a stage.
    fn power_trace(&self, key: StageKey, rider: &str) -> Result<Option<RealTrack>, PowerError>;
}

/// Tracks stored on disk:
///
/// ```text
/// <root>/Routes/<year>/stage-<n>-parcours.gpx
/// <root>/Routes/<year>/<rider>/stage_<n>.tcx
/// ```
#[derive(Debug, Clone)]
pub struct RouteDirectory {
    root: PathBuf,
}

impl RouteDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn year_dir(&self, year: u16) -> PathBuf {
        self.root.join("Routes").join(year.to_string())
    }

    pub fn route_path(&self, key: StageKey) -> PathBuf {
        self.year_dir(key.year)
            .join(format!("stage-{}-parcours.gpx", key.stage_index))
    }

    pub fn trace_path(&self, key: StageKey, rider: &str) -> PathBuf {
        self.year_dir(key.year)
            .join(rider)
            .join(format!("stage_{}.tcx", key.stage_index))
    }

    /// Riders with a directory for the given year, sorted by name.
    pub fn riders(&self, year: u16) -> Result<Vec<String>, PowerError> {
        let entries = match fs::read_dir(self.year_dir(year)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut riders = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                riders.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        riders.sort();
        Ok(riders)
    }

    /// Sources that can be shown for a stage: always `Estimated`, then the
    /// official route if present, then every rider with a trace for the stage.
    pub fn available_sources(&self, key: StageKey) -> Result<Vec<ProfileSource>, PowerError> {
        let mut sources = vec![ProfileSource::Estimated];
        if self.route_path(key).is_file() {
            sources.push(ProfileSource::Gpx);
        }
        for rider in self.riders(key.year)? {
            if self.trace_path(key, &rider).is_file() {
                sources.push(ProfileSource::Rider(rider));
            }
        }
        Ok(sources)
    }
}

/// A rider name has to be a single plain directory name under the year.
fn check_rider(rider: &str) -> Result<(), PowerError> {
    let mut components = Path::new(rider).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == rider => Ok(()),
        _ => Err(PowerError::InvalidInput(format!(
            "invalid rider name {rider:?}"
        ))),
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, PowerError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No track at {}", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

impl TrackProvider for RouteDirectory {
    fn route(&self, key: StageKey) -> Result<Option<RealTrack>, PowerError> {
        let Some(content) = read_optional(&self.route_path(key))? else {
            return Ok(None);
        };
        let points = file_parsers::parse_gpx(content.as_bytes())?;
        Ok(Some(RealTrack::new(TrackSource::MeasuredGps, points)))
    }

    fn power_trace(&self, key: StageKey, rider: &str) -> Result<Option<RealTrack>, PowerError> {
        check_rider(rider)?;
        let Some(content) = read_optional(&self.trace_path(key, rider))? else {
            return Ok(None);
        };
        let points = file_parsers::parse_tcx(&content)?;
        Ok(Some(RealTrack::new(
            TrackSource::MeasuredPowerTrace {
                rider: rider.to_string(),
            },
            points,
        )))
    }
}

/// In-memory provider.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTracks {
    routes: HashMap<StageKey, Vec<TrackPoint>>,
    traces: HashMap<(StageKey, String), Vec<TrackPoint>>,
}

impl InMemoryTracks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, key: StageKey, points: Vec<TrackPoint>) -> Self {
        self.routes.insert(key, points);
        self
    }

    pub fn with_power_trace(
        mut self,
        key: StageKey,
        rider: impl Into<String>,
        points: Vec<TrackPoint>,
    ) -> Self {
        self.traces.insert((key, rider.into()), points);
        self
    }
}

impl TrackProvider for InMemoryTracks {
    fn route(&self, key: StageKey) -> Result<Option<RealTrack>, PowerError> {
        Ok(self
            .routes
            .get(&key)
            .map(|points| RealTrack::new(TrackSource::MeasuredGps, points.clone())))
    }

    fn power_trace(&self, key: StageKey, rider: &str) -> Result<Option<RealTrack>, PowerError> {
        Ok(self.traces.get(&(key, rider.to_string())).map(|points| {
            RealTrack::new(
                TrackSource::MeasuredPowerTrace {
                    rider: rider.to_string(),
                },
                points.clone(),
            )
        }))
    }
}
