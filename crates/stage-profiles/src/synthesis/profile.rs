//! Synthetic stage profiles.
//!
//! When no measured track exists, a stage is drawn as `peak_count`
//! valley-to-peak climbs whose heights sum to the stage's vertical meters and
//! whose spacing sums to its distance. The curve is illustrative only: every
//! call produces a different shape.

use std::sync::LazyLock;

use enum_map::{EnumMap, enum_map};
use rand::Rng;
use serde::{Deserialize, Serialize};
use stages::{PowerError, ProfileClass, ProfileCurve, StageRecord};
use tracing::debug;

use super::segments::{SegmentMode, scaled_random_segments_with};
use crate::config::SynthesisConfig;

/// Number of climbs and finish type drawn for a profile class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileShape {
    pub peak_count: usize,
    pub flat_finish: bool,
}

impl ProfileShape {
    pub const fn new(peak_count: usize, flat_finish: bool) -> Self {
        Self {
            peak_count,
            flat_finish,
        }
    }
}

static PROFILE_SHAPES: LazyLock<EnumMap<ProfileClass, ProfileShape>> = LazyLock::new(|| {
    enum_map! {
        ProfileClass::Flat => ProfileShape::new(40, true),
        ProfileClass::HillsFlatFinish => ProfileShape::new(20, true),
        ProfileClass::HillsUphillFinish => ProfileShape::new(20, false),
        ProfileClass::MountainsFlatFinish => ProfileShape::new(7, true),
        ProfileClass::MountainsUphillFinish => ProfileShape::new(7, false),
    }
});

pub fn shape_for(class: ProfileClass) -> ProfileShape {
    PROFILE_SHAPES[class]
}

/// Totals a synthesized profile has to honour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileTargets {
    pub total_distance_km: f64,
    pub total_vertical_m: f64,
    pub departure_elevation_m: f64,
    pub arrival_elevation_m: f64,
}

impl ProfileTargets {
    pub fn from_stage(stage: &StageRecord) -> Self {
        Self {
            total_distance_km: stage.distance_km,
            total_vertical_m: stage.vertical_meters,
            departure_elevation_m: stage.departure_elevation_m,
            arrival_elevation_m: stage.arrival_elevation_m,
        }
    }
}

/// Builds a curve of `2 * peak_count` points alternating valley and peak.
///
/// The first point is `(0, departure)`, the last is `(total distance, arrival)`;
/// with a flat finish the second-to-last point is also at arrival elevation.
pub fn synthesize_profile(
    targets: &ProfileTargets,
    shape: ProfileShape,
    config: &SynthesisConfig,
    rng: &mut impl Rng,
) -> Result<ProfileCurve, PowerError> {
    config.validate()?;
    let departure = targets.departure_elevation_m;
    let arrival = targets.arrival_elevation_m;
    if !departure.is_finite() || !arrival.is_finite() {
        return Err(PowerError::InvalidInput(format!(
            "endpoint elevations must be finite, got {departure} and {arrival}"
        )));
    }

    let gains = scaled_random_segments_with(
        targets.total_vertical_m,
        shape.peak_count,
        SegmentMode::Elevation {
            flat_finish: shape.flat_finish,
        },
        config.elevation_draws,
        config.final_dip_units,
        rng,
    )?;

    let point_count = shape.peak_count * 2;
    let distances = scaled_random_segments_with(
        targets.total_distance_km,
        point_count,
        SegmentMode::Distance,
        config.distance_draws,
        config.final_dip_units,
        rng,
    )?;

    let xs: Vec<f64> = distances
        .iter()
        .scan(0.0, |acc, d| {
            *acc += d;
            Some(*acc)
        })
        .collect();

    let mut ys: Vec<f64> = (0..point_count)
        .map(|i| {
            if i % 2 == 1 {
                departure + gains[i / 2]
            } else {
                departure
            }
        })
        .collect();

    let last = point_count - 1;
    ys[0] = departure;
    ys[last] = arrival;
    if shape.flat_finish {
        ys[last - 1] = arrival;
    }

    debug!(
        peak_count = shape.peak_count,
        flat_finish = shape.flat_finish,
        total_distance_km = targets.total_distance_km,
        total_vertical_m = targets.total_vertical_m,
        "Synthesized profile"
    );

    Ok(ProfileCurve::from_xy(&xs, &ys))
}

/// Synthesizes a profile for a stage from its totals and profile class.
pub fn synthesize_stage(
    stage: &StageRecord,
    config: &SynthesisConfig,
    rng: &mut impl Rng,
) -> Result<ProfileCurve, PowerError> {
    let shape = shape_for(stage.profile_class()?);
    synthesize_profile(&ProfileTargets::from_stage(stage), shape, config, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn targets() -> ProfileTargets {
        ProfileTargets {
            total_distance_km: 165.0,
            total_vertical_m: 3600.0,
            departure_elevation_m: 420.0,
            arrival_elevation_m: 1850.0,
        }
    }

    #[test]
    fn test_shape_table() {
        assert_eq!(shape_for(ProfileClass::Flat), ProfileShape::new(40, true));
        assert_eq!(
            shape_for(ProfileClass::HillsFlatFinish),
            ProfileShape::new(20, true)
        );
        assert_eq!(
            shape_for(ProfileClass::HillsUphillFinish),
            ProfileShape::new(20, false)
        );
        assert_eq!(
            shape_for(ProfileClass::MountainsFlatFinish),
            ProfileShape::new(7, true)
        );
        assert_eq!(
            shape_for(ProfileClass::MountainsUphillFinish),
            ProfileShape::new(7, false)
        );
    }

    #[test]
    fn test_flat_finish_endpoints() {
        let mut rng = StdRng::seed_from_u64(42);
        let curve = synthesize_profile(
            &targets(),
            ProfileShape::new(7, true),
            &SynthesisConfig::default(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(curve.len(), 14);
        let first = curve.points[0];
        assert_eq!(first.distance_km, 0.0);
        assert_eq!(first.elevation_m, 420.0);
        assert_eq!(curve.points[13].elevation_m, 1850.0);
        assert_eq!(curve.points[12].elevation_m, 1850.0);
        assert!((curve.total_distance_km() - 165.0).abs() < 1e-9);
    }

    #[test]
    fn test_uphill_finish_endpoints() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..20 {
            let curve = synthesize_profile(
                &targets(),
                ProfileShape::new(7, false),
                &SynthesisConfig::default(),
                &mut rng,
            )
            .unwrap();
            let n = curve.len();
            assert_eq!(curve.points[n - 1].elevation_m, 1850.0);
            // Second-to-last is the last valley, back at departure elevation.
            assert_eq!(curve.points[n - 2].elevation_m, 420.0);
        }
    }

    #[test]
    fn test_distance_is_monotonic() {
        let mut rng = StdRng::seed_from_u64(1);
        let curve = synthesize_profile(
            &targets(),
            ProfileShape::new(20, false),
            &SynthesisConfig::default(),
            &mut rng,
        )
        .unwrap();
        for pair in curve.points.windows(2) {
            assert!(pair[1].distance_km > pair[0].distance_km);
        }
    }

    #[test]
    fn test_peaks_alternate_with_valleys() {
        let mut rng = StdRng::seed_from_u64(2);
        let curve = synthesize_profile(
            &targets(),
            ProfileShape::new(20, true),
            &SynthesisConfig::default(),
            &mut rng,
        )
        .unwrap();
        let n = curve.len();
        for (i, point) in curve.points.iter().enumerate().take(n - 2).skip(1) {
            if i % 2 == 0 {
                assert_eq!(point.elevation_m, 420.0);
            } else {
                assert!(point.elevation_m > 420.0);
            }
        }
    }

    #[test]
    fn test_single_peak_is_rejected() {
        let mut rng = StdRng::seed_from_u64(2);
        let result = synthesize_profile(
            &targets(),
            ProfileShape::new(1, true),
            &SynthesisConfig::default(),
            &mut rng,
        );
        assert!(matches!(result, Err(PowerError::InvalidInput(_))));
    }

    #[test]
    fn test_non_finite_elevation_is_rejected() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut t = targets();
        t.arrival_elevation_m = f64::NAN;
        assert!(
            synthesize_profile(&t, ProfileShape::new(7, true), &SynthesisConfig::default(), &mut rng)
                .is_err()
        );
    }
}
