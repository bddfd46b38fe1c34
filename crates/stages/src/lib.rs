//! Stage data and cycling power estimates.
//!
//! - [`physics`]: the power model (gravity, rolling resistance, drag, drivetrain loss)
//! - [`aggregator`]: per-edition and per-stage power estimates
//! - [`dataset`]: stage CSV loading
//! - [`file_parsers`] / [`providers`]: measured GPX routes and TCX power traces

pub mod aggregator;
pub mod dataset;
pub mod errors;
pub mod file_parsers;
pub mod models;
pub mod physics;
pub mod providers;

pub use errors::PowerError;
pub use models::{
    Coordinate, CurvePoint, ProfileClass, ProfileCurve, RealTrack, StageKey, StageRecord,
    StageType, TrackPoint, TrackSource, YearPower,
};
