//! Edition-level and per-stage power estimates.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::errors::PowerError;
use crate::models::{StageRecord, YearPower};
use crate::physics;

/// Reduces the stages of each year into one power estimate.
///
/// Years are independent: a year whose window is empty (zero total time or
/// distance) is reported as [`PowerError::InvalidAggregateWindow`] while the
/// other years still compute.
pub fn aggregate_year(stages: &[StageRecord]) -> BTreeMap<u16, Result<YearPower, PowerError>> {
    let mut groups: BTreeMap<u16, Vec<&StageRecord>> = BTreeMap::new();
    for stage in stages {
        groups.entry(stage.year).or_default().push(stage);
    }

    let results: BTreeMap<u16, Result<YearPower, PowerError>> = groups
        .into_par_iter()
        .map(|(year, group)| (year, reduce_year(year, &group)))
        .collect();

    for (year, result) in &results {
        if let Err(e) = result {
            warn!("Skipping {year}: {e}");
        }
    }

    results
}

fn reduce_year(year: u16, group: &[&StageRecord]) -> Result<YearPower, PowerError> {
    let stage_count = group.len();
    let total_climb_m: f64 = group.iter().map(|s| s.vertical_meters).sum();
    let total_distance_km: f64 = group.iter().map(|s| s.distance_km).sum();
    let total_time_s: f64 = group.iter().map(|s| s.gc_stage_time_s).sum();
    let mean_weight_kg = group.iter().map(|s| s.gc_weight_kg).sum::<f64>() / stage_count as f64;

    let total_distance_m = total_distance_km * 1000.0;
    if total_distance_m == 0.0 || !total_distance_m.is_finite() {
        return Err(PowerError::InvalidAggregateWindow {
            year,
            reason: format!("total distance is {total_distance_km} km"),
        });
    }
    if total_time_s == 0.0 || !total_time_s.is_finite() {
        return Err(PowerError::InvalidAggregateWindow {
            year,
            reason: format!("total time is {total_time_s} s"),
        });
    }

    let mean_grade = total_climb_m / total_distance_m;
    let mean_velocity_m_s = total_distance_m / total_time_s;
    let power_w = physics::required_power(mean_grade, mean_weight_kg, mean_velocity_m_s)?;

    debug!(
        year,
        stage_count, mean_grade, mean_velocity_m_s, power_w, "Aggregated edition"
    );

    Ok(YearPower {
        year,
        stage_count,
        total_climb_m,
        total_distance_km,
        mean_weight_kg,
        total_time_s,
        mean_grade,
        mean_velocity_m_s,
        power_w,
    })
}

/// Power estimate for one stage from its mean grade, GC weight and GC speed.
pub fn stage_power(stage: &StageRecord) -> Result<f64, PowerError> {
    physics::required_power(stage.grade, stage.gc_weight_kg, stage.gc_speed_m_s)
}

/// Like [`stage_power`], adjusted to the stage's profile class.
pub fn stage_power_for_profile(stage: &StageRecord) -> Result<f64, PowerError> {
    let class = stage.profile_class()?;
    physics::required_power_for_profile(stage.grade, stage.gc_weight_kg, stage.gc_speed_m_s, class)
}
